use daos_acl::*;

fn main() -> Result<(), Error> {
    env_logger::init();

    let mut acl = Acl::from_strings(&[
        "A::OWNER@:rw",
        "A:G:GROUP@:r",
        "A::EVERYONE@:",
    ])?;

    // alice may read and write, failed writes are audited
    let mut alice = Ace::new(PrincipalType::User, Some("alice@"))?;

    alice.set_access_types(ACCESS_ALLOW | ACCESS_AUDIT);
    alice.set_access_flags(FLAG_ACCESS_FAIL);
    alice.set_allow_perms(PERM_READ | PERM_WRITE);
    alice.set_audit_perms(PERM_WRITE);
    acl.add_ace(&alice)?;

    // the owning group gets write access as well, replacing its entry
    acl.add_ace(&"A:G:GROUP@:rw".parse::<Ace>()?)?;

    // everyone else loses the (empty) entry altogether
    acl.remove_ace(PrincipalType::Everyone, None)?;

    acl.validate()?;
    print!("{}", acl);

    // alice's entry has different allow and audit permissions and thus no compact form
    for entry in &acl {
        match entry.to_compact_string() {
            Ok(s)  => println!("{}", s),
            Err(e) => println!("{} ({})", entry.principal_type().map(|t| t.to_string()).unwrap_or_default(), e),
        } // match
    } // for

    // the packed form is what gets stored and sent
    let copy = Acl::from_bytes(acl.as_bytes())?;
    assert_eq!(copy, acl);

    Ok(())
} // main
