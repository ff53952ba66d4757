//! Access Control Lists for pools and containers of an object store, in a packed binary form that
//! can be stored as an attribute and sent over the wire as is.
//!
//! An ACL is a list of Access Control Entries (ACEs). Each entry names a principal and carries the
//! permissions granted to it, plus optional audit and alarm settings. The ACL itself never decides
//! whether an access is granted; it is the validated, canonical container that such decisions are
//! made from.
//!
//! # Principals
//!
//! There are five kinds of principals, and this is also the order in which their entries appear
//! in every ACL:
//!
//! 1. the *owner* of the object,
//! 2. named *users*,
//! 3. the *owning group* of the object,
//! 4. named *groups*,
//! 5. *everyone* else.
//!
//! Owner, owning group and everyone are special principals: they carry no name and may appear at
//! most once. Users and groups are named `name@domain`, where the domain may be empty, and each name
//! may appear once per type.
//!
//! # Entries
//!
//! An entry is created for a principal and then filled in. Access types are a bit mask of allow,
//! audit and alarm, and each access type present has its own permission mask. Audit and alarm
//! entries need to say whether they trigger on failed or successful access:
//!
//! ```rust
//! # use daos_acl::*;
//! let mut ace = Ace::new(PrincipalType::User, Some("alice@")).unwrap();
//!
//! ace.set_access_types(ACCESS_ALLOW | ACCESS_AUDIT);
//! ace.set_access_flags(FLAG_ACCESS_FAIL);
//! ace.set_allow_perms(PERM_READ | PERM_WRITE);
//! ace.set_audit_perms(PERM_WRITE);
//!
//! assert!(ace.is_valid());
//! assert_eq!(ace.principal(), Some("alice@"));
//! ```
//!
//! # Lists
//!
//! `Acl::new` sorts the entries into canonical order. Adding an entry for a principal that is
//! already present replaces it, removing one that is absent is an error. Every change produces a
//! fresh buffer, so a failed operation leaves the list as it was:
//!
//! ```rust
//! # use daos_acl::*;
//! let everyone = Ace::new(PrincipalType::Everyone, None).unwrap();
//! let owner    = Ace::new(PrincipalType::Owner, None).unwrap();
//! let mut acl  = Acl::new(&[everyone, owner]).unwrap();
//!
//! let types: Vec<_> = acl.iter().map(|e| e.principal_type()).collect();
//! assert_eq!(types, vec![Some(PrincipalType::Owner), Some(PrincipalType::Everyone)]);
//!
//! let mut bob = Ace::new(PrincipalType::User, Some("bob@")).unwrap();
//! bob.set_access_types(ACCESS_ALLOW);
//! bob.set_allow_perms(PERM_READ);
//! acl.add_ace(&bob).unwrap();
//!
//! assert_eq!(acl.get_ace(PrincipalType::User, Some("bob@")).unwrap().allow_perms(), PERM_READ);
//! assert!(acl.remove_ace(PrincipalType::Group, Some("staff@")).is_err());
//! assert_eq!(acl.len(), 3);
//! assert!(acl.validate().is_ok());
//! ```
//!
//! Buffers received from elsewhere go through `Acl::from_bytes`, which accepts nothing that
//! `validate` would reject.
//!
//! # String form
//!
//! Entries have a compact text form, `access:flags:principal:perms`, used by tools that let people
//! edit ACLs. The special principals are spelled `OWNER@`, `GROUP@` and `EVERYONE@`:
//!
//! ```rust
//! # use daos_acl::*;
//! let acl = Acl::from_strings(&["A::EVERYONE@:r", "A::OWNER@:rw", "A:G:staff@:rw"]).unwrap();
//!
//! assert_eq!(acl.to_strings().unwrap(), vec!["A::OWNER@:rw", "A:G:staff@:rw", "A::EVERYONE@:r"]);
//! ```

use std::fmt;

mod ace;
mod acl;
mod order;
mod text;
mod validate;
pub mod principal;

pub use ace::{
    Ace, AceRead, AceRef, PrincipalType,
    ACE_HEADER_LEN, MAX_PRINCIPAL_LEN, MAX_PRINCIPAL_BUF_LEN,
    ACCESS_ALLOW, ACCESS_AUDIT, ACCESS_ALARM,
    FLAG_GROUP, FLAG_POOL_INHERIT, FLAG_ACCESS_FAIL, FLAG_ACCESS_SUCCESS,
    PERM_READ, PERM_WRITE,
};
pub use acl::{Acl, Entries, ACL_HEADER_LEN, ACL_VERSION, MAX_ACE_LEN};
pub use order::{compare as compare_principal_types, is_duplicate};
pub use text::MAX_ACE_STR_LEN;
pub use validate::validate_bytes;


// Error //////////////////////////////////////////////////////////////////////////////////////////


#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Malformed input: a bad entry, a bad buffer, a bad string or a list that would exceed its
    /// limits.
    InvalidArgument(String),
    /// Well-formed request for a principal that is not there.
    NotFound(String),
    /// A buffer could not be allocated. Nothing was changed.
    OutOfMemory,
} // enum Error

impl fmt::Display for Error {

    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            Error::InvalidArgument(s) =>
                write!(f, "Invalid argument: {}", s),
            Error::NotFound(s) =>
                write!(f, "Not found: {}", s),
            Error::OutOfMemory =>
                write!(f, "out of memory"),
        } // match
    } // fmt

} // impl fmt::Display for Error

impl std::error::Error for Error {}


// Tests //////////////////////////////////////////////////////////////////////////////////////////


// mod tests
