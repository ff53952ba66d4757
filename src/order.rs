//! Canonical ordering and uniqueness of entries. Construction, mutation, lookup and validation all
//! go through these functions so they can never disagree about what a well-formed ACL looks like.

use std::cmp::Ordering;

use crate::ace::{AceRead, PrincipalType};


/// Canonical order of principal types: Owner < User < OwnerGroup < Group < Everyone.
#[inline]
pub fn compare(a: PrincipalType, b: PrincipalType) -> Ordering {
    a.as_raw().cmp(&b.as_raw())
} // compare

/// Orders two entries by principal type. Entries with an unknown type byte sort after every known
/// type, ordered by their raw value among themselves.
pub(crate) fn compare_entries<A, B>(a: &A, b: &B) -> Ordering
where
    A: AceRead + ?Sized,
    B: AceRead + ?Sized,
{
    match (a.principal_type(), b.principal_type()) {
        (Some(a), Some(b)) => compare(a, b),
        (Some(_), None)    => Ordering::Less,
        (None, Some(_))    => Ordering::Greater,
        (None, None)       => a.raw_principal_type().cmp(&b.raw_principal_type()),
    } // match
} // compare_entries

/// Two entries are duplicates if they have the same principal type and either the type is special
/// or the names are byte-equal up to their terminators. Padding after the terminator is ignored.
pub fn is_duplicate<A, B>(a: &A, b: &B) -> bool
where
    A: AceRead + ?Sized,
    B: AceRead + ?Sized,
{
    match (a.principal_type(), b.principal_type()) {
        (Some(ta), Some(tb)) if ta == tb => matches(a, ta, b.principal_bytes()),
        _ => false,
    } // match
} // is_duplicate

/// True if `ace` is the entry for principal `ptype`/`name`. The name is ignored for special types.
pub(crate) fn matches<A: AceRead + ?Sized>(ace: &A, ptype: PrincipalType, name: &[u8]) -> bool {
    if ace.principal_type() != Some(ptype) {
        return false;
    } // if
    ptype.is_special() || ace.principal_bytes() == name
} // matches


// Tests //////////////////////////////////////////////////////////////////////////////////////////


// mod tests
