//! Principal names and their mapping to local user and group ids.
//!
//! Named principals are written `name@domain`, where the domain may be empty. The library never
//! consults the operating system itself: the caller hands in an [`IdentityLookup`] that resolves
//! names and ids, for instance one backed by the system user database or the in-memory
//! [`IdentityTable`].

use log::{trace, warn};
use std::collections::BTreeMap;

use crate::ace::MAX_PRINCIPAL_LEN;
use crate::Error;


/// True if `name` has the `name@[domain]` form: exactly one `@`, a non-empty part before it, at most
/// `MAX_PRINCIPAL_LEN` bytes and no NUL. Characters are not checked any further and the principal is
/// not looked up.
pub fn is_valid(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_PRINCIPAL_LEN || name.contains('\0') {
        return false;
    } // if

    let mut parts = name.splitn(2, '@');

    match (parts.next(), parts.next()) {
        (Some(user), Some(domain)) => !user.is_empty() && !domain.contains('@'),
        _                          => false,
    } // match
} // is_valid

/// The part of a principal before the `@`.
fn local_name(principal: &str) -> Result<&str, Error> {
    if !is_valid(principal) {
        warn!("malformed principal: {:?}", principal);
        return Err(Error::InvalidArgument(format!("malformed principal: {:?}", principal)));
    } // if
    Ok(principal.splitn(2, '@').next().unwrap_or(principal))
} // local_name


// IdentityLookup /////////////////////////////////////////////////////////////////////////////////


/// Resolves local user and group names and ids. Every method returns `None` if the name or id is
/// unknown.
pub trait IdentityLookup {

    fn user_name(&self, uid: u32) -> Option<String>;

    fn group_name(&self, gid: u32) -> Option<String>;

    fn uid(&self, name: &str) -> Option<u32>;

    fn gid(&self, name: &str) -> Option<u32>;

} // trait IdentityLookup

/// Formats the user with id `uid` as a principal, `name@`.
pub fn uid_to_principal<L: IdentityLookup + ?Sized>(lookup: &L, uid: u32) -> Result<String, Error> {
    trace!("converting uid {} to principal", uid);
    match lookup.user_name(uid) {
        Some(name) => Ok(format!("{}@", name)),
        None       => {
            warn!("unknown uid: {}", uid);
            Err(Error::NotFound(format!("uid {}", uid)))
        }, // None
    } // match
} // uid_to_principal

/// Formats the group with id `gid` as a principal, `name@`.
pub fn gid_to_principal<L: IdentityLookup + ?Sized>(lookup: &L, gid: u32) -> Result<String, Error> {
    trace!("converting gid {} to principal", gid);
    match lookup.group_name(gid) {
        Some(name) => Ok(format!("{}@", name)),
        None       => {
            warn!("unknown gid: {}", gid);
            Err(Error::NotFound(format!("gid {}", gid)))
        }, // None
    } // match
} // gid_to_principal

/// Resolves a user principal to its uid. The domain part is ignored.
pub fn principal_to_uid<L: IdentityLookup + ?Sized>(lookup: &L, principal: &str) -> Result<u32, Error> {
    trace!("converting principal {} to uid", principal);
    let name = local_name(principal)?;

    lookup.uid(name).ok_or_else(|| {
        warn!("unknown user: {}", name);
        Error::NotFound(format!("user {}", name))
    }) // ok_or_else
} // principal_to_uid

/// Resolves a group principal to its gid. The domain part is ignored.
pub fn principal_to_gid<L: IdentityLookup + ?Sized>(lookup: &L, principal: &str) -> Result<u32, Error> {
    trace!("converting principal {} to gid", principal);
    let name = local_name(principal)?;

    lookup.gid(name).ok_or_else(|| {
        warn!("unknown group: {}", name);
        Error::NotFound(format!("group {}", name))
    }) // ok_or_else
} // principal_to_gid


// IdentityTable //////////////////////////////////////////////////////////////////////////////////


/// In-memory identity database.
#[derive(Clone, Debug, Default)]
pub struct IdentityTable {
    users:  BTreeMap<u32, String>,
    groups: BTreeMap<u32, String>,
} // struct IdentityTable

impl IdentityTable {

    pub fn new() -> Self {
        Self::default()
    } // new

    /// Adds or renames a user.
    pub fn add_user(&mut self, uid: u32, name: &str) -> &mut Self {
        trace!("adding user {} with uid {}", name, uid);
        self.users.insert(uid, String::from(name));
        self
    } // add_user

    /// Adds or renames a group.
    pub fn add_group(&mut self, gid: u32, name: &str) -> &mut Self {
        trace!("adding group {} with gid {}", name, gid);
        self.groups.insert(gid, String::from(name));
        self
    } // add_group

} // impl IdentityTable

fn id_of(map: &BTreeMap<u32, String>, name: &str) -> Option<u32> {
    map.iter().find(|(_, n)| n.as_str() == name).map(|(id, _)| *id)
} // id_of

impl IdentityLookup for IdentityTable {

    fn user_name(&self, uid: u32) -> Option<String> {
        self.users.get(&uid).cloned()
    } // user_name

    fn group_name(&self, gid: u32) -> Option<String> {
        self.groups.get(&gid).cloned()
    } // group_name

    fn uid(&self, name: &str) -> Option<u32> {
        id_of(&self.users, name)
    } // uid

    fn gid(&self, name: &str) -> Option<u32> {
        id_of(&self.groups, name)
    } // gid

} // impl IdentityLookup for IdentityTable


// Tests //////////////////////////////////////////////////////////////////////////////////////////


// mod tests
