//! The Access Control List: an 8-byte header followed by a table of packed entries.
//!
//! | offset | size | field        |
//! |--------|------|--------------|
//! | 0      | 2    | version      |
//! | 2      | 2    | reserved     |
//! | 4      | 4    | table length |
//! | 8      | len  | entries      |

use log::{debug, trace, warn};
use std::fmt;

use crate::ace::{self, Ace, AceRead, AceRef, PrincipalType};
use crate::order;
use crate::validate;
use crate::Error;


// Constants //////////////////////////////////////////////////////////////////////////////////////


/// Version of the ACL format written and accepted by this crate.
pub const ACL_VERSION: u16 = 1;

/// Size of the ACL header.
pub const ACL_HEADER_LEN: usize = 8;

/// Maximum length of the entry table in bytes.
pub const MAX_ACE_LEN: usize = 8192;

const OFF_VERSION: usize = 0;
const OFF_TABLE_LEN: usize = 4;


// Buffer helpers /////////////////////////////////////////////////////////////////////////////////


/// Builds a complete ACL buffer from packed entries. Nothing is returned unless the whole buffer
/// could be built.
fn pack(version: u16, entries: &[&[u8]]) -> Result<Vec<u8>, Error> {
    let table_len: usize = entries.iter().map(|e| e.len()).sum();

    if table_len > MAX_ACE_LEN {
        warn!("entry table of {} bytes exceeds the maximum of {}", table_len, MAX_ACE_LEN);
        return Err(Error::InvalidArgument(format!("entry table of {} bytes exceeds the maximum of {}", table_len, MAX_ACE_LEN)));
    } // if

    let mut buf = Vec::new();

    buf.try_reserve_exact(ACL_HEADER_LEN + table_len).map_err(|_| {
        warn!("could not allocate {} bytes for acl", ACL_HEADER_LEN + table_len);
        Error::OutOfMemory
    })?;
    buf.extend_from_slice(&version.to_ne_bytes());
    buf.extend_from_slice(&0u16.to_ne_bytes());
    buf.extend_from_slice(&(table_len as u32).to_ne_bytes());
    for entry in entries {
        buf.extend_from_slice(entry);
    } // for
    Ok(buf)
} // pack

/// Name to look up for a principal. Named types need a non-empty name, special types ignore it.
fn lookup_name(ptype: PrincipalType, name: Option<&str>) -> Result<&[u8], Error> {
    if ptype.is_special() {
        return Ok(&[]);
    } // if
    match name {
        Some(name) if !name.is_empty() => Ok(name.as_bytes()),
        _ => {
            warn!("{} lookup requires a principal name", ptype);
            Err(Error::InvalidArgument(format!("{} lookup requires a principal name", ptype)))
        }, // _
    } // match
} // lookup_name

fn not_found(ptype: PrincipalType, name: &[u8]) -> Error {
    let what = if name.is_empty() {
        ptype.to_string()
    } else {
        format!("{} {}", ptype, String::from_utf8_lossy(name))
    }; // else
    debug!("no entry for {}", what);
    Error::NotFound(what)
} // not_found


// Acl ////////////////////////////////////////////////////////////////////////////////////////////


/// An owned Access Control List. The buffer is only ever replaced as a whole, so a value is either
/// the old list or the new one, never something in between.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Acl {
    buf: Vec<u8>,
} // struct Acl

impl Acl {

    /// Creates an ACL from entries. The entries are stably sorted into canonical order and packed
    /// into a single buffer. Content and uniqueness are not checked here; see `validate`.
    pub fn new(aces: &[Ace]) -> Result<Self, Error> {
        trace!("creating acl with {} entries", aces.len());
        let mut sorted: Vec<&Ace> = aces.iter().collect();

        sorted.sort_by(|a, b| order::compare_entries(*a, *b));

        let entries: Vec<&[u8]> = sorted.iter().map(|a| a.as_bytes()).collect();

        Ok(Acl{buf: pack(ACL_VERSION, &entries)?})
    } // new

    /// Decodes an ACL from its packed form. The buffer is fully validated first.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        trace!("decoding acl from {} bytes", bytes.len());
        validate::validate_bytes(bytes)?;

        let mut buf = Vec::new();

        buf.try_reserve_exact(bytes.len()).map_err(|_| Error::OutOfMemory)?;
        buf.extend_from_slice(bytes);
        Ok(Acl{buf})
    } // from_bytes

    /// The packed form: header and entry table.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    } // as_bytes

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    } // into_bytes

    #[inline]
    pub fn version(&self) -> u16 {
        u16::from_ne_bytes([self.buf[OFF_VERSION], self.buf[OFF_VERSION + 1]])
    } // version

    /// Declared length of the entry table.
    #[inline]
    pub fn table_len(&self) -> usize {
        let raw = &self.buf[OFF_TABLE_LEN..OFF_TABLE_LEN + 4];
        u32::from_ne_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize
    } // table_len

    /// Size of header plus entry table in bytes.
    #[inline]
    pub fn total_size(&self) -> usize {
        ACL_HEADER_LEN + self.table_len()
    } // total_size

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.iter().count()
    } // len

    pub fn is_empty(&self) -> bool {
        self.table_len() == 0
    } // is_empty

    /// The entry table, bounded by both the declared length and the buffer.
    fn table(&self) -> &[u8] {
        let end = (ACL_HEADER_LEN + self.table_len()).min(self.buf.len());
        &self.buf[ACL_HEADER_LEN..end]
    } // table

    /// Iterates over the entries in buffer order.
    pub fn iter(&self) -> Entries<'_> {
        Entries{table: self.table(), offset: 0}
    } // iter

    /// Steps through the entries. `None` yields the first entry, otherwise the entry following
    /// `current`. Returns `None` past the last entry and when `current` is not an entry boundary of
    /// this ACL.
    pub fn next_ace(&self, current: Option<&AceRef<'_>>) -> Option<AceRef<'_>> {
        let mut entries = self.iter();

        match current {
            None          => entries.next(),
            Some(current) => {
                entries.by_ref().find(|e| e.is_same(current))?;
                entries.next()
            }, // Some
        } // match
    } // next_ace

    /// Finds the entry for a principal. User and group lookups need a name, it is ignored for the
    /// special types.
    pub fn get_ace(&self, ptype: PrincipalType, name: Option<&str>) -> Result<AceRef<'_>, Error> {
        trace!("getting ace for {} {:?}", ptype, name);
        let name = lookup_name(ptype, name)?;

        self.iter()
            .find(|e| order::matches(e, ptype, name))
            .ok_or_else(|| not_found(ptype, name))
    } // get_ace

    /// Returns a new ACL with `new_ace` added. An existing entry for the same principal is
    /// replaced in place; otherwise the entry goes after the last entry of its own type. The
    /// version of this ACL is kept.
    pub fn with_ace(&self, new_ace: &Ace) -> Result<Acl, Error> {
        trace!("adding ace {:?}", new_ace);
        let ptype = match new_ace.principal_type() {
            Some(ptype) if new_ace.is_valid() => ptype,
            _ => {
                warn!("refusing to add invalid ace");
                return Err(Error::InvalidArgument(String::from("invalid access control entry")));
            }, // _
        }; // match

        let mut entries: Vec<&[u8]> = Vec::new();
        let mut placed = false;

        entries.try_reserve(self.table_len() / ace::ACE_HEADER_LEN + 1).map_err(|_| Error::OutOfMemory)?;
        for entry in self.iter() {
            if !placed {
                if order::is_duplicate(&entry, new_ace) {
                    debug!("replacing {} entry at offset {}", ptype, entry.offset());
                    entries.push(new_ace.as_bytes());
                    placed = true;
                    continue;
                } // if
                if order::compare_entries(&entry, new_ace) == std::cmp::Ordering::Greater {
                    debug!("inserting {} entry at offset {}", ptype, entry.offset());
                    entries.push(new_ace.as_bytes());
                    placed = true;
                } // if
            } // if
            entries.push(entry.bytes());
        } // for
        if !placed {
            debug!("appending {} entry", ptype);
            entries.push(new_ace.as_bytes());
        } // if
        Ok(Acl{buf: pack(self.version(), &entries)?})
    } // with_ace

    /// Adds or replaces an entry. On error the ACL is unchanged.
    pub fn add_ace(&mut self, new_ace: &Ace) -> Result<(), Error> {
        let acl = self.with_ace(new_ace)?;

        *self = acl;
        Ok(())
    } // add_ace

    /// Returns a new ACL without the entry for the principal. `NotFound` if there is none.
    pub fn without_ace(&self, ptype: PrincipalType, name: Option<&str>) -> Result<Acl, Error> {
        trace!("removing ace for {} {:?}", ptype, name);
        let name = lookup_name(ptype, name)?;
        let mut entries: Vec<&[u8]> = Vec::new();
        let mut removed = false;

        entries.try_reserve(self.table_len() / ace::ACE_HEADER_LEN).map_err(|_| Error::OutOfMemory)?;
        for entry in self.iter() {
            if !removed && order::matches(&entry, ptype, name) {
                debug!("removing {} entry at offset {}", ptype, entry.offset());
                removed = true;
                continue;
            } // if
            entries.push(entry.bytes());
        } // for
        if !removed {
            return Err(not_found(ptype, name));
        } // if
        Ok(Acl{buf: pack(self.version(), &entries)?})
    } // without_ace

    /// Removes the entry for a principal. On error the ACL is unchanged.
    pub fn remove_ace(&mut self, ptype: PrincipalType, name: Option<&str>) -> Result<(), Error> {
        let acl = self.without_ace(ptype, name)?;

        *self = acl;
        Ok(())
    } // remove_ace

    /// Checks the whole ACL: framing, every entry, ordering and uniqueness.
    pub fn validate(&self) -> Result<(), Error> {
        validate::validate_bytes(&self.buf)
    } // validate

} // impl Acl

impl Default for Acl {

    /// The empty ACL.
    fn default() -> Self {
        let mut buf = vec![0u8; ACL_HEADER_LEN];

        buf[OFF_VERSION..OFF_VERSION + 2].copy_from_slice(&ACL_VERSION.to_ne_bytes());
        Acl{buf}
    } // default

} // impl Default for Acl

impl<'a> IntoIterator for &'a Acl {
    type Item = AceRef<'a>;
    type IntoIter = Entries<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    } // into_iter

} // impl IntoIterator for &Acl

impl fmt::Debug for Acl {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("Acl")
            .field("version", &self.version())
            .field("len", &self.table_len())
            .field("aces", &self.iter().collect::<Vec<_>>())
            .finish()
    } // fmt

} // impl fmt::Debug for Acl

impl fmt::Display for Acl {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        writeln!(f, "Access Control List:")?;
        writeln!(f, "\tVersion: {}", self.version())?;
        writeln!(f, "\tLength: {}", self.table_len())?;
        for entry in self {
            ace::dump(&entry, 1, f)?;
        } // for
        Ok(())
    } // fmt

} // impl fmt::Display for Acl


// Entries ////////////////////////////////////////////////////////////////////////////////////////


/// Iterator over the entries of an ACL. Stops at the first entry that does not fit the table.
#[derive(Clone, Debug)]
pub struct Entries<'a> {
    table:  &'a [u8],
    offset: usize,
} // struct Entries

impl<'a> Iterator for Entries<'a> {
    type Item = AceRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.table.len() {
            return None;
        } // if
        match AceRef::parse_at(self.table, self.offset) {
            Ok(entry) => {
                self.offset += entry.size();
                Some(entry)
            }, // Ok
            Err(reason) => {
                warn!("stopping iteration at offset {}: {}", self.offset, reason);
                self.offset = self.table.len();
                None
            }, // Err
        } // match
    } // next

} // impl Iterator for Entries


// Tests //////////////////////////////////////////////////////////////////////////////////////////


#[cfg(test)]
mod tests {

    use super::*;
    use crate::ace::{ACCESS_ALLOW, PERM_READ, PERM_WRITE};
    use test_env_log::test;

    fn users(n: usize) -> Vec<Ace> {
        (0..n).map(|i| Ace::new(PrincipalType::User, Some(format!("user{}@", i).as_str())).unwrap()).collect()
    } // users

    fn all_types(user: &str, group: &str) -> Vec<Ace> {
        PrincipalType::ALL.iter().map(|&ptype| match ptype {
            PrincipalType::User  => Ace::new(ptype, Some(user)).unwrap(),
            PrincipalType::Group => Ace::new(ptype, Some(group)).unwrap(),
            _                    => Ace::new(ptype, None).unwrap(),
        }).collect()
    } // all_types

    fn table_size(aces: &[Ace]) -> usize {
        aces.iter().map(|a| a.size()).sum()
    } // table_size

    fn readable(mut ace: Ace) -> Ace {
        ace.set_access_types(ACCESS_ALLOW);
        ace.set_allow_perms(PERM_READ);
        ace
    } // readable

    /// Offset where an entry of `ptype` is expected after insertion: after its own type's run.
    fn offset_for_type(ptype: PrincipalType, aces: &[Ace]) -> usize {
        aces.iter()
            .take_while(|a| a.principal_type().map_or(false, |t| t <= ptype))
            .map(|a| a.size())
            .sum()
    } // offset_for_type

    #[test]
    fn create_empty() {
        let acl = Acl::new(&[]).unwrap();

        assert_eq!(acl.version(), ACL_VERSION);
        assert_eq!(acl.table_len(), 0);
        assert!(acl.is_empty());
        assert_eq!(acl.total_size(), ACL_HEADER_LEN);
        assert_eq!(acl, Acl::default());
        assert!(acl.iter().next().is_none());
    } // create_empty

    #[test]
    fn create_one() {
        let ace = Ace::new(PrincipalType::Owner, None).unwrap();
        let acl = Acl::new(&[ace.clone()]).unwrap();

        assert_eq!(acl.table_len(), ace.size());
        assert_eq!(&acl.as_bytes()[ACL_HEADER_LEN..], ace.as_bytes());
    } // create_one

    #[test]
    fn create_multiple() {
        let aces = users(3);
        let acl  = Acl::new(&aces).unwrap();

        assert_eq!(acl.table_len(), table_size(&aces));
        assert_eq!(acl.len(), 3);
        for (entry, ace) in acl.iter().zip(aces.iter()) {
            assert_eq!(entry, *ace);
        } // for
    } // create_multiple

    #[test]
    fn create_sorts_shuffled() {
        let mut aces = all_types("user1@", "group1@");

        aces.reverse();
        aces.swap(0, 2);

        let acl   = Acl::new(&aces).unwrap();
        let types: Vec<_> = acl.iter().map(|e| e.principal_type().unwrap()).collect();

        assert_eq!(types, PrincipalType::ALL.to_vec());
        assert_eq!(acl.table_len(), table_size(&aces));
    } // create_sorts_shuffled

    #[test]
    fn create_is_stable_within_type() {
        let aces = vec![
            Ace::new(PrincipalType::Group, Some("zeta@")).unwrap(),
            Ace::new(PrincipalType::User, Some("bob@")).unwrap(),
            Ace::new(PrincipalType::Group, Some("alpha@")).unwrap(),
            Ace::new(PrincipalType::User, Some("alice@")).unwrap(),
        ];
        let acl   = Acl::new(&aces).unwrap();
        let names: Vec<_> = acl.iter().map(|e| e.principal().unwrap().to_string()).collect();

        assert_eq!(names, vec!["bob@", "alice@", "zeta@", "alpha@"]);
    } // create_is_stable_within_type

    #[test]
    fn create_rejects_oversized_table() {
        let long = "u".repeat(200);
        let aces: Vec<Ace> = (0..40)
            .map(|i| Ace::new(PrincipalType::User, Some(format!("{}{}@", long, i).as_str())).unwrap())
            .collect();

        assert!(matches!(Acl::new(&aces), Err(Error::InvalidArgument(_))));
    } // create_rejects_oversized_table

    #[test]
    fn scenario_presorted() {
        let aces = vec![
            Ace::new(PrincipalType::Owner, None).unwrap(),
            Ace::new(PrincipalType::User, Some("alice@")).unwrap(),
            Ace::new(PrincipalType::Group, Some("admins@")).unwrap(),
            Ace::new(PrincipalType::Everyone, None).unwrap(),
        ];
        let acl = Acl::new(&aces).unwrap();

        assert_eq!(acl.table_len(), table_size(&aces));
        assert_eq!(acl.total_size(), ACL_HEADER_LEN + table_size(&aces));
        assert_eq!(acl.iter().collect::<Vec<_>>(), aces);
        assert!(acl.validate().is_ok());
    } // scenario_presorted

    #[test]
    fn duplicate_is_byte_equal() {
        let empty = Acl::default();
        let acl   = Acl::new(&users(4)).unwrap();

        assert_eq!(empty.clone().as_bytes(), empty.as_bytes());
        assert_eq!(acl.clone().as_bytes(), acl.as_bytes());
    } // duplicate_is_byte_equal

    #[test]
    fn next_ace_walk() {
        let aces = users(2);
        let acl  = Acl::new(&aces).unwrap();

        let first = acl.next_ace(None).unwrap();
        assert_eq!(first.offset(), 0);
        assert_eq!(first, aces[0]);

        let second = acl.next_ace(Some(&first)).unwrap();
        assert_eq!(second.offset(), aces[0].size());
        assert_eq!(second, aces[1]);

        assert!(acl.next_ace(Some(&second)).is_none());
    } // next_ace_walk

    #[test]
    fn next_ace_empty() {
        let acl = Acl::default();

        assert!(acl.next_ace(None).is_none());
    } // next_ace_empty

    #[test]
    fn next_ace_foreign_cursor() {
        let acl   = Acl::new(&users(2)).unwrap();
        let other = acl.clone();
        let cur   = other.next_ace(None).unwrap();

        assert!(acl.next_ace(Some(&cur)).is_none());

        // not on a boundary
        let bogus = AceRef::parse_at(&acl.as_bytes()[ACL_HEADER_LEN + 8..], 0).unwrap();
        assert!(acl.next_ace(Some(&bogus)).is_none());
    } // next_ace_foreign_cursor

    #[test]
    fn get_ace() {
        let aces = users(2);
        let acl  = Acl::new(&aces).unwrap();

        let first = acl.get_ace(PrincipalType::User, Some("user0@")).unwrap();
        assert_eq!(first.offset(), 0);
        assert_eq!(first, aces[0]);

        let later = acl.get_ace(PrincipalType::User, Some("user1@")).unwrap();
        assert_eq!(later.offset(), aces[0].size());
        assert_eq!(later, aces[1]);

        assert!(matches!(acl.get_ace(PrincipalType::Group, Some("user0@")), Err(Error::NotFound(_))));
        assert!(matches!(acl.get_ace(PrincipalType::User, Some("notinthelist")), Err(Error::NotFound(_))));
    } // get_ace

    #[test]
    fn get_ace_name_needed() {
        let acl = Acl::new(&all_types("user1@", "group1@")).unwrap();

        assert!(matches!(acl.get_ace(PrincipalType::User, None), Err(Error::InvalidArgument(_))));
        assert!(matches!(acl.get_ace(PrincipalType::Group, Some("")), Err(Error::InvalidArgument(_))));
    } // get_ace_name_needed

    #[test]
    fn get_ace_name_not_needed() {
        let acl = Acl::new(&all_types("user1@", "group1@")).unwrap();

        for &ptype in &[PrincipalType::Owner, PrincipalType::OwnerGroup, PrincipalType::Everyone] {
            assert_eq!(acl.get_ace(ptype, None).unwrap().principal_type(), Some(ptype));
            assert_eq!(acl.get_ace(ptype, Some("whatever@")).unwrap().principal_type(), Some(ptype));
        } // for
    } // get_ace_name_not_needed

    #[test]
    fn add_to_empty() {
        for ace in vec![
            readable(Ace::new(PrincipalType::Everyone, None).unwrap()),
            readable(Ace::new(PrincipalType::User, Some("myuser@")).unwrap()),
        ] {
            let mut acl  = Acl::default();
            let original = acl.clone();

            acl.add_ace(&ace).unwrap();
            assert_eq!(acl.version(), original.version());
            assert_eq!(acl.table_len(), ace.size());
            assert_eq!(&acl.as_bytes()[ACL_HEADER_LEN..], ace.as_bytes());
        } // for
    } // add_to_empty

    #[test]
    fn add_inserts_after_own_type() {
        let cases = vec![
            (all_types("user1@", "group1@"), readable(Ace::new(PrincipalType::User, Some("newuser@")).unwrap())),
            (all_types("user1@", "group1@"), readable(Ace::new(PrincipalType::Group, Some("newgroup@")).unwrap())),
        ];
        let base     = all_types("user1@", "group1@");
        let mut more = Vec::new();

        // special types go into a list that lacks them
        for &ptype in &[PrincipalType::Owner, PrincipalType::OwnerGroup, PrincipalType::Everyone] {
            let without: Vec<Ace> = base.iter().filter(|a| a.principal_type() != Some(ptype)).cloned().collect();
            more.push((without, readable(Ace::new(ptype, None).unwrap())));
        } // for

        for (aces, new_ace) in cases.into_iter().chain(more) {
            let mut acl  = Acl::new(&aces).unwrap();
            let original = acl.clone();
            let offset   = offset_for_type(new_ace.principal_type().unwrap(), &aces);

            acl.add_ace(&new_ace).unwrap();
            assert_eq!(acl.version(), original.version());
            assert_eq!(acl.table_len(), original.table_len() + new_ace.size());

            let start = ACL_HEADER_LEN + offset;
            assert_eq!(&acl.as_bytes()[start..start + new_ace.size()], new_ace.as_bytes());
            assert!(acl.validate().is_ok());
        } // for
    } // add_inserts_after_own_type

    #[test]
    fn add_exact_duplicate_is_unchanged() {
        let aces = all_types("user1@", "group1@");

        for ace in &aces {
            let mut acl  = Acl::new(&aces).unwrap();
            let original = acl.clone();

            acl.add_ace(ace).unwrap();
            assert_eq!(acl.total_size(), original.total_size());
            assert_eq!(acl.as_bytes(), original.as_bytes());
        } // for
    } // add_exact_duplicate_is_unchanged

    #[test]
    fn add_replaces_in_place() {
        let aces     = all_types("user1@", "group1@");
        let mut acl  = Acl::new(&aces).unwrap();
        let original = acl.clone();
        let mut new_ace = Ace::new(PrincipalType::User, Some("user1@")).unwrap();

        new_ace.set_access_types(ACCESS_ALLOW);
        new_ace.set_allow_perms(PERM_READ | PERM_WRITE);
        acl.add_ace(&new_ace).unwrap();

        assert_eq!(acl.table_len(), original.table_len());

        let found = acl.get_ace(PrincipalType::User, Some("user1@")).unwrap();
        assert_eq!(found.offset(), aces[0].size());
        assert_eq!(found, new_ace);
        for ptype in PrincipalType::ALL.iter().filter(|t| **t != PrincipalType::User) {
            let name = match ptype { PrincipalType::Group => Some("group1@"), _ => None };
            assert_eq!(acl.get_ace(*ptype, name).unwrap().as_bytes(), original.get_ace(*ptype, name).unwrap().as_bytes());
        } // for
    } // add_replaces_in_place

    #[test]
    fn add_rejects_invalid_ace() {
        let mut acl = Acl::new(&users(2)).unwrap();
        let before  = acl.clone();
        let mut bad = Ace::new(PrincipalType::Owner, None).unwrap();

        bad.set_access_types(1 << 7);
        assert!(matches!(acl.add_ace(&bad), Err(Error::InvalidArgument(_))));
        assert_eq!(acl, before);
    } // add_rejects_invalid_ace

    #[test]
    fn with_ace_leaves_original() {
        let acl     = Acl::new(&users(2)).unwrap();
        let before  = acl.clone();
        let new_acl = acl.with_ace(&Ace::new(PrincipalType::Everyone, None).unwrap()).unwrap();

        assert_eq!(acl, before);
        assert_eq!(new_acl.len(), 3);
    } // with_ace_leaves_original

    #[test]
    fn rebuilt_tables_copy_existing_entries() {
        let aces   = all_types("user1@", "group1@");
        let acl    = Acl::new(&aces).unwrap();
        let added  = acl.with_ace(&readable(Ace::new(PrincipalType::User, Some("user2@")).unwrap())).unwrap();
        let pruned = added.without_ace(PrincipalType::User, Some("user2@")).unwrap();

        assert_eq!(added.len(), aces.len() + 1);
        for ace in &aces {
            let ptype = ace.principal_type().unwrap();
            assert_eq!(added.get_ace(ptype, ace.principal()).unwrap(), *ace);
        } // for
        assert_eq!(pruned, acl);
        assert!(pruned.validate().is_ok());
    } // rebuilt_tables_copy_existing_entries

    #[test]
    fn add_past_capacity_fails() {
        let long    = "g".repeat(200);
        let mut acl = Acl::default();
        let mut err = None;

        for i in 0..64 {
            let ace = Ace::new(PrincipalType::Group, Some(format!("{}{}@", long, i).as_str())).unwrap();
            if let Err(e) = acl.add_ace(&ace) {
                err = Some(e);
                break;
            } // if
        } // for
        assert!(matches!(err, Some(Error::InvalidArgument(_))));
        assert!(acl.table_len() <= MAX_ACE_LEN);
        assert!(acl.validate().is_ok());
    } // add_past_capacity_fails

    #[test]
    fn remove_each_type() {
        let aces = all_types("user1@", "group1@");

        for ace in &aces {
            let ptype    = ace.principal_type().unwrap();
            let mut acl  = Acl::new(&aces).unwrap();
            let original = acl.clone();

            acl.remove_ace(ptype, ace.principal()).unwrap();
            assert_eq!(acl.total_size(), original.total_size() - ace.size());
            assert!(matches!(acl.get_ace(ptype, ace.principal()), Err(Error::NotFound(_))));

            let rest: Vec<&Ace> = aces.iter().filter(|a| *a != ace).collect();
            let left: Vec<_>    = acl.iter().collect();
            assert_eq!(left.len(), rest.len());
            for (entry, expected) in left.iter().zip(rest) {
                assert_eq!(entry, expected);
            } // for
        } // for
    } // remove_each_type

    #[test]
    fn remove_middle_user_keeps_order() {
        let aces    = users(3);
        let mut acl = Acl::new(&aces).unwrap();

        acl.remove_ace(PrincipalType::User, Some("user1@")).unwrap();

        let left: Vec<_> = acl.iter().collect();
        assert_eq!(left, vec![aces[0].clone(), aces[2].clone()]);
    } // remove_middle_user_keeps_order

    #[test]
    fn remove_errors() {
        let mut acl = Acl::new(&users(2)).unwrap();
        let before  = acl.clone();

        assert!(matches!(acl.remove_ace(PrincipalType::User, None), Err(Error::InvalidArgument(_))));
        assert!(matches!(acl.remove_ace(PrincipalType::Group, Some("")), Err(Error::InvalidArgument(_))));
        assert!(matches!(acl.remove_ace(PrincipalType::User, Some("nobody@")), Err(Error::NotFound(_))));
        assert!(matches!(acl.remove_ace(PrincipalType::Owner, None), Err(Error::NotFound(_))));
        assert_eq!(acl, before);
    } // remove_errors

    #[test]
    fn remove_last_entry() {
        let mut acl = Acl::new(&[Ace::new(PrincipalType::Everyone, None).unwrap()]).unwrap();

        acl.remove_ace(PrincipalType::Everyone, None).unwrap();
        assert!(acl.is_empty());
        assert_eq!(acl, Acl::default());
    } // remove_last_entry

    #[test]
    fn bytes_round_trip() {
        let acl = Acl::new(&all_types("user1@", "group1@")).unwrap();

        assert_eq!(Acl::from_bytes(acl.as_bytes()).unwrap(), acl);
        assert!(Acl::from_bytes(&acl.as_bytes()[..acl.total_size() - 8]).is_err());
    } // bytes_round_trip

    #[test]
    fn dump_lists_entries() {
        let acl  = Acl::new(&all_types("user1@", "group1@")).unwrap();
        let text = acl.to_string();

        assert!(text.starts_with("Access Control List:"));
        assert_eq!(text.matches("Access Control Entry:").count(), 5);
        assert!(text.contains("Principal: group1@"));
    } // dump_lists_entries

} // mod tests
