//! Access Control Entries: the packed binary record for one principal.
//!
//! An entry is a fixed 32-byte header followed by the principal name. The name is only present
//! for named principals (users and groups), is NUL-terminated and padded with unspecified bytes
//! to a multiple of 8. The header fields, in order and in host byte order, are:
//!
//! | offset | size | field                     |
//! |--------|------|---------------------------|
//! | 0      | 1    | access types present      |
//! | 1      | 1    | principal type            |
//! | 2      | 2    | declared name length      |
//! | 4      | 2    | access flags              |
//! | 6      | 2    | reserved                  |
//! | 8      | 8    | allow permissions         |
//! | 16     | 8    | audit permissions         |
//! | 24     | 8    | alarm permissions         |

use log::{trace, warn};
use std::cmp::Ordering;
use std::fmt;

use crate::order;
use crate::Error;


// Constants //////////////////////////////////////////////////////////////////////////////////////


/// Size of the fixed part of an entry.
pub const ACE_HEADER_LEN: usize = 32;

/// Maximum length of a principal name, not including the terminator.
pub const MAX_PRINCIPAL_LEN: usize = 255;

/// Maximum length of a principal name including the terminator.
pub const MAX_PRINCIPAL_BUF_LEN: usize = MAX_PRINCIPAL_LEN + 1;

/// Access is allowed.
pub const ACCESS_ALLOW: u8 = 1 << 0;
/// Access is logged for review.
pub const ACCESS_AUDIT: u8 = 1 << 1;
/// Access raises an alarm.
pub const ACCESS_ALARM: u8 = 1 << 2;

/// The principal is a group, not a user.
pub const FLAG_GROUP: u16 = 1 << 0;
/// Containers inherit this entry from the pool.
pub const FLAG_POOL_INHERIT: u16 = 1 << 1;
/// Audit and alarm trigger on failed access.
pub const FLAG_ACCESS_FAIL: u16 = 1 << 2;
/// Audit and alarm trigger on successful access.
pub const FLAG_ACCESS_SUCCESS: u16 = 1 << 3;

pub const PERM_READ: u64 = 1 << 0;
pub const PERM_WRITE: u64 = 1 << 1;

pub(crate) const ACCESS_ALL: u8 = ACCESS_ALLOW | ACCESS_AUDIT | ACCESS_ALARM;
pub(crate) const FLAGS_ALL: u16 = FLAG_GROUP | FLAG_POOL_INHERIT | FLAG_ACCESS_FAIL | FLAG_ACCESS_SUCCESS;
pub(crate) const PERMS_ALL: u64 = PERM_READ | PERM_WRITE;

const OFF_ACCESS_TYPES: usize = 0;
const OFF_PRINCIPAL_TYPE: usize = 1;
const OFF_PRINCIPAL_LEN: usize = 2;
const OFF_ACCESS_FLAGS: usize = 4;
const OFF_ALLOW_PERMS: usize = 8;
const OFF_AUDIT_PERMS: usize = 16;
const OFF_ALARM_PERMS: usize = 24;


// PrincipalType //////////////////////////////////////////////////////////////////////////////////


/// Kind of principal an entry applies to. The declaration order is the canonical order of
/// entries within an ACL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PrincipalType {
    /// Owner of the object.
    Owner = 0,
    /// Individual named user.
    User = 1,
    /// Owning group of the object.
    OwnerGroup = 2,
    /// Individual named group.
    Group = 3,
    /// Anyone else.
    Everyone = 4,
} // enum PrincipalType

impl PrincipalType {

    /// All principal types in canonical order.
    pub const ALL: [PrincipalType; 5] = [
        PrincipalType::Owner,
        PrincipalType::User,
        PrincipalType::OwnerGroup,
        PrincipalType::Group,
        PrincipalType::Everyone,
    ];

    /// Maps the raw on-disk value to a principal type.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(PrincipalType::Owner),
            1 => Some(PrincipalType::User),
            2 => Some(PrincipalType::OwnerGroup),
            3 => Some(PrincipalType::Group),
            4 => Some(PrincipalType::Everyone),
            _ => None,
        } // match
    } // from_raw

    #[inline]
    pub fn as_raw(self) -> u8 {
        self as u8
    } // as_raw

    /// User and group entries carry a principal name.
    #[inline]
    pub fn is_named(self) -> bool {
        matches!(self, PrincipalType::User | PrincipalType::Group)
    } // is_named

    /// Owner, owning group and everyone may appear only once and carry no name.
    #[inline]
    pub fn is_special(self) -> bool {
        !self.is_named()
    } // is_special

    #[inline]
    pub fn is_group(self) -> bool {
        matches!(self, PrincipalType::OwnerGroup | PrincipalType::Group)
    } // is_group

} // impl PrincipalType

impl PartialOrd for PrincipalType {

    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    } // partial_cmp

} // impl PartialOrd for PrincipalType

impl Ord for PrincipalType {

    fn cmp(&self, other: &Self) -> Ordering {
        order::compare(*self, *other)
    } // cmp

} // impl Ord for PrincipalType

impl fmt::Display for PrincipalType {

    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let name = match self {
            PrincipalType::Owner      => "Owner",
            PrincipalType::User       => "User",
            PrincipalType::OwnerGroup => "Owner Group",
            PrincipalType::Group      => "Group",
            PrincipalType::Everyone   => "Everyone",
        }; // match
        f.write_str(name)
    } // fmt

} // impl fmt::Display for PrincipalType


// Field access ///////////////////////////////////////////////////////////////////////////////////


#[inline]
fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_ne_bytes([bytes[offset], bytes[offset + 1]])
} // read_u16

#[inline]
fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_ne_bytes(raw)
} // read_u64

#[inline]
fn write_u16(bytes: &mut [u8], offset: usize, value: u16) {
    bytes[offset..offset + 2].copy_from_slice(&value.to_ne_bytes());
} // write_u16

#[inline]
fn write_u64(bytes: &mut [u8], offset: usize, value: u64) {
    bytes[offset..offset + 8].copy_from_slice(&value.to_ne_bytes());
} // write_u64

/// Name part of a packed record, cut at the terminator.
#[inline]
pub(crate) fn name_of(record: &[u8]) -> &[u8] {
    let name = &record[ACE_HEADER_LEN..];
    match name.iter().position(|b| *b == 0) {
        Some(end) => &name[..end],
        None      => name,
    } // match
} // name_of

/// Name buffer length for a principal name: name plus terminator, rounded up to 8 bytes.
#[inline]
pub(crate) fn aligned_name_len(name_len: usize) -> usize {
    (name_len + 1 + 7) & !7
} // aligned_name_len

mod private {
    pub trait Sealed {}
} // mod private


// AceRead ////////////////////////////////////////////////////////////////////////////////////////


/// Read access to a packed entry, shared by owned entries (`Ace`) and entries borrowed out of an
/// ACL (`AceRef`). Implementors guarantee the record holds at least the full header.
pub trait AceRead: private::Sealed {

    /// The packed record, header and name buffer.
    fn as_bytes(&self) -> &[u8];

    fn access_types(&self) -> u8 {
        self.as_bytes()[OFF_ACCESS_TYPES]
    } // access_types

    /// The principal type byte as stored, which may be out of range for untrusted records.
    fn raw_principal_type(&self) -> u8 {
        self.as_bytes()[OFF_PRINCIPAL_TYPE]
    } // raw_principal_type

    fn principal_type(&self) -> Option<PrincipalType> {
        PrincipalType::from_raw(self.raw_principal_type())
    } // principal_type

    /// Declared length of the name buffer.
    fn principal_len(&self) -> u16 {
        read_u16(self.as_bytes(), OFF_PRINCIPAL_LEN)
    } // principal_len

    fn access_flags(&self) -> u16 {
        read_u16(self.as_bytes(), OFF_ACCESS_FLAGS)
    } // access_flags

    fn allow_perms(&self) -> u64 {
        read_u64(self.as_bytes(), OFF_ALLOW_PERMS)
    } // allow_perms

    fn audit_perms(&self) -> u64 {
        read_u64(self.as_bytes(), OFF_AUDIT_PERMS)
    } // audit_perms

    fn alarm_perms(&self) -> u64 {
        read_u64(self.as_bytes(), OFF_ALARM_PERMS)
    } // alarm_perms

    /// Permissions for one access type bit. Returns `None` for anything but a single known bit.
    fn perms(&self, access_type: u8) -> Option<u64> {
        match access_type {
            ACCESS_ALLOW => Some(self.allow_perms()),
            ACCESS_AUDIT => Some(self.audit_perms()),
            ACCESS_ALARM => Some(self.alarm_perms()),
            _            => None,
        } // match
    } // perms

    /// Name bytes up to the terminator, padding excluded. Empty for special principals.
    fn principal_bytes(&self) -> &[u8] {
        name_of(self.as_bytes())
    } // principal_bytes

    /// The principal name, if there is one and it is UTF-8.
    fn principal(&self) -> Option<&str> {
        let name = self.principal_bytes();
        if name.is_empty() {
            return None;
        } // if
        std::str::from_utf8(name).ok()
    } // principal

    /// Size of the record: header plus declared name length.
    fn size(&self) -> usize {
        ACE_HEADER_LEN + self.principal_len() as usize
    } // size

    /// Checks every per-entry invariant. Never fails, returns false on any violation.
    fn is_valid(&self) -> bool {
        let bytes = self.as_bytes();

        if bytes.len() < ACE_HEADER_LEN || bytes.len() != self.size() {
            warn!("ace size {} disagrees with declared name length {}", bytes.len(), self.principal_len());
            return false;
        } // if

        let ptype = match self.principal_type() {
            Some(ptype) => ptype,
            None        => {
                warn!("invalid principal type {}", self.raw_principal_type());
                return false;
            }, // None
        }; // match
        let access = self.access_types();
        let flags  = self.access_flags();

        if access & !ACCESS_ALL != 0 {
            warn!("undefined access type bits: {:#x}", access);
            return false;
        } // if
        if flags & !FLAGS_ALL != 0 {
            warn!("undefined flag bits: {:#x}", flags);
            return false;
        } // if
        if (flags & FLAG_GROUP != 0) != ptype.is_group() {
            warn!("group flag does not match principal type {}", ptype);
            return false;
        } // if
        if !principal_is_consistent(ptype, bytes) {
            return false;
        } // if
        if access & (ACCESS_AUDIT | ACCESS_ALARM) != 0
            && flags & (FLAG_ACCESS_FAIL | FLAG_ACCESS_SUCCESS) == 0 {
            warn!("audit/alarm entry without access-fail or access-success flag");
            return false;
        } // if

        for &bit in &[ACCESS_ALLOW, ACCESS_AUDIT, ACCESS_ALARM] {
            let perms = self.perms(bit).unwrap_or(0);

            if perms & !PERMS_ALL != 0 {
                warn!("undefined permission bits: {:#x}", perms);
                return false;
            } // if
            if perms != 0 && access & bit == 0 {
                warn!("permissions set for absent access type {:#x}", bit);
                return false;
            } // if
        } // for
        true
    } // is_valid

    /// Formats the entry as `access:flags:principal:perms`, e.g. `AD:F:OWNER@:rw` or
    /// `A:G:staff@:r`. Access letters are `A`, `D` and `L` for allow, audit and alarm, flag letters
    /// `G`, `P`, `F` and `S`, permission letters `r` and `w`. Fails for invalid entries and for
    /// entries whose access types carry different permissions or whose name is not `name@domain`.
    fn to_compact_string(&self) -> Result<String, Error> {
        crate::text::ace_to_string(self)
    } // to_compact_string

    /// Deep copy into an owned entry.
    fn to_ace(&self) -> Ace {
        Ace{buf: self.as_bytes().to_vec()}
    } // to_ace

} // trait AceRead

/// Name present iff the type is named, aligned, terminated and within the maximum length.
fn principal_is_consistent(ptype: PrincipalType, bytes: &[u8]) -> bool {
    let name = &bytes[ACE_HEADER_LEN..];

    if !ptype.is_named() {
        if !name.is_empty() {
            warn!("{} entry carries a principal name", ptype);
            return false;
        } // if
        return true;
    } // if
    if name.is_empty() || name.len() % 8 != 0 {
        warn!("{} entry has bad principal length {}", ptype, name.len());
        return false;
    } // if
    match name.iter().position(|b| *b == 0) {
        None => {
            warn!("principal name is not terminated");
            false
        }, // None
        Some(0) => {
            warn!("principal name is empty");
            false
        }, // Some
        Some(len) if len > MAX_PRINCIPAL_LEN => {
            warn!("principal name exceeds {} bytes", MAX_PRINCIPAL_LEN);
            false
        }, // Some
        Some(_) => true,
    } // match
} // principal_is_consistent


// Ace ////////////////////////////////////////////////////////////////////////////////////////////


/// An owned Access Control Entry.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ace {
    buf: Vec<u8>,
} // struct Ace

impl Ace {

    /// Creates an entry for a principal. User and group entries require a non-empty name, all other
    /// types ignore it. Access types and permissions start out empty; the group flag follows the
    /// principal type.
    pub fn new(ptype: PrincipalType, name: Option<&str>) -> Result<Self, Error> {
        trace!("creating ace for {} {:?}", ptype, name);
        let name = if ptype.is_named() {
            match name {
                Some(name) if !name.is_empty() => name.as_bytes(),
                _ => {
                    warn!("{} entry requires a principal name", ptype);
                    return Err(Error::InvalidArgument(format!("{} entry requires a principal name", ptype)));
                }, // _
            } // match
        } else {
            &[][..]
        }; // else

        if name.len() > MAX_PRINCIPAL_LEN {
            warn!("principal name exceeds {} bytes", MAX_PRINCIPAL_LEN);
            return Err(Error::InvalidArgument(format!("principal name exceeds {} bytes", MAX_PRINCIPAL_LEN)));
        } // if
        if name.contains(&0) {
            warn!("principal name contains a NUL byte");
            return Err(Error::InvalidArgument(String::from("principal name contains a NUL byte")));
        } // if

        let name_len = if name.is_empty() { 0 } else { aligned_name_len(name.len()) };
        let mut buf  = vec![0u8; ACE_HEADER_LEN + name_len];

        buf[OFF_PRINCIPAL_TYPE] = ptype.as_raw();
        write_u16(&mut buf, OFF_PRINCIPAL_LEN, name_len as u16);
        if ptype.is_group() {
            write_u16(&mut buf, OFF_ACCESS_FLAGS, FLAG_GROUP);
        } // if
        buf[ACE_HEADER_LEN..ACE_HEADER_LEN + name.len()].copy_from_slice(name);
        Ok(Ace{buf})
    } // new

    /// Decodes one packed record. Only the framing is checked: the header must be complete and the
    /// buffer must be exactly as long as the declared name length says. Use `is_valid` for the
    /// content.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        trace!("decoding ace from {} bytes", bytes.len());
        if bytes.len() < ACE_HEADER_LEN {
            warn!("ace buffer too short: {} bytes", bytes.len());
            return Err(Error::InvalidArgument(format!("ace buffer too short: {} bytes", bytes.len())));
        } // if

        let size = ACE_HEADER_LEN + read_u16(bytes, OFF_PRINCIPAL_LEN) as usize;

        if size != bytes.len() {
            warn!("ace buffer length {} does not match declared size {}", bytes.len(), size);
            return Err(Error::InvalidArgument(format!("ace buffer length {} does not match declared size {}", bytes.len(), size)));
        } // if
        Ok(Ace{buf: bytes.to_vec()})
    } // from_bytes

    #[inline]
    pub fn set_access_types(&mut self, access: u8) {
        self.buf[OFF_ACCESS_TYPES] = access;
    } // set_access_types

    #[inline]
    pub fn set_access_flags(&mut self, flags: u16) {
        write_u16(&mut self.buf, OFF_ACCESS_FLAGS, flags);
    } // set_access_flags

    #[inline]
    pub fn set_allow_perms(&mut self, perms: u64) {
        write_u64(&mut self.buf, OFF_ALLOW_PERMS, perms);
    } // set_allow_perms

    #[inline]
    pub fn set_audit_perms(&mut self, perms: u64) {
        write_u64(&mut self.buf, OFF_AUDIT_PERMS, perms);
    } // set_audit_perms

    #[inline]
    pub fn set_alarm_perms(&mut self, perms: u64) {
        write_u64(&mut self.buf, OFF_ALARM_PERMS, perms);
    } // set_alarm_perms

    /// Sets the permissions of one access type bit. Unknown bits are rejected.
    pub fn set_perms(&mut self, access_type: u8, perms: u64) -> Result<(), Error> {
        match access_type {
            ACCESS_ALLOW => self.set_allow_perms(perms),
            ACCESS_AUDIT => self.set_audit_perms(perms),
            ACCESS_ALARM => self.set_alarm_perms(perms),
            _            => {
                warn!("unknown access type {:#x}", access_type);
                return Err(Error::InvalidArgument(format!("unknown access type {:#x}", access_type)));
            }, // _
        } // match
        Ok(())
    } // set_perms

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    } // into_bytes

} // impl Ace

impl private::Sealed for Ace {}

impl AceRead for Ace {

    #[inline]
    fn as_bytes(&self) -> &[u8] {
        &self.buf
    } // as_bytes

} // impl AceRead for Ace

impl fmt::Debug for Ace {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        debug_fields(self, "Ace", f)
    } // fmt

} // impl fmt::Debug for Ace

/// Multi-line dump of every field. The compact `access:flags:principal:perms` form is
/// `AceRead::to_compact_string`.
impl fmt::Display for Ace {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        dump(self, 0, f)
    } // fmt

} // impl fmt::Display for Ace


// AceRef /////////////////////////////////////////////////////////////////////////////////////////


/// An entry borrowed from the table of an ACL, together with its offset in that table.
#[derive(Clone, Copy)]
pub struct AceRef<'a> {
    bytes:  &'a [u8],
    offset: usize,
} // struct AceRef

impl<'a> AceRef<'a> {

    /// Frames the entry starting at `offset` in `table`. Fails if the header or the declared name
    /// buffer would run past the end of the table.
    pub(crate) fn parse_at(table: &'a [u8], offset: usize) -> Result<Self, &'static str> {
        let rest = table.get(offset..).ok_or("entry offset outside of table")?;

        if rest.len() < ACE_HEADER_LEN {
            return Err("truncated entry header");
        } // if

        let size  = ACE_HEADER_LEN + read_u16(rest, OFF_PRINCIPAL_LEN) as usize;
        let bytes = rest.get(..size).ok_or("entry overruns table")?;

        Ok(AceRef{bytes, offset})
    } // parse_at

    /// Byte offset of this entry within the ACL's entry table.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    } // offset

    /// The packed record, borrowed for as long as the ACL it came from.
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    } // bytes

    /// True if both refer to the very same bytes of the very same table.
    pub(crate) fn is_same(&self, other: &AceRef<'_>) -> bool {
        self.offset == other.offset
            && self.bytes.len() == other.bytes.len()
            && std::ptr::eq(self.bytes.as_ptr(), other.bytes.as_ptr())
    } // is_same

} // impl AceRef

impl<'a> private::Sealed for AceRef<'a> {}

impl<'a> AceRead for AceRef<'a> {

    #[inline]
    fn as_bytes(&self) -> &[u8] {
        self.bytes
    } // as_bytes

} // impl AceRead for AceRef

impl<'a> PartialEq<Ace> for AceRef<'a> {

    fn eq(&self, other: &Ace) -> bool {
        self.bytes == other.as_bytes()
    } // eq

} // impl PartialEq<Ace> for AceRef

impl<'a> fmt::Debug for AceRef<'a> {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        debug_fields(self, "AceRef", f)
    } // fmt

} // impl fmt::Debug for AceRef

/// Multi-line dump, as for `Ace`. See `AceRead::to_compact_string` for the compact form.
impl<'a> fmt::Display for AceRef<'a> {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        dump(self, 0, f)
    } // fmt

} // impl fmt::Display for AceRef


// Dump ///////////////////////////////////////////////////////////////////////////////////////////


fn debug_fields<A: AceRead>(ace: &A, name: &str, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
    f.debug_struct(name)
        .field("access_types", &ace.access_types())
        .field("principal_type", &ace.raw_principal_type())
        .field("principal_len", &ace.principal_len())
        .field("access_flags", &ace.access_flags())
        .field("allow_perms", &ace.allow_perms())
        .field("audit_perms", &ace.audit_perms())
        .field("alarm_perms", &ace.alarm_perms())
        .field("principal", &String::from_utf8_lossy(ace.principal_bytes()))
        .finish()
} // debug_fields

/// Human readable, multi-line rendition of an entry, indented by `tabs` levels.
pub(crate) fn dump<A: AceRead>(ace: &A, tabs: usize, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
    let pad = "\t".repeat(tabs);

    writeln!(f, "{}Access Control Entry:", pad)?;
    match ace.principal_type() {
        Some(ptype) => writeln!(f, "{}\tType: {}", pad, ptype)?,
        None        => writeln!(f, "{}\tType: invalid ({})", pad, ace.raw_principal_type())?,
    } // match
    if ace.principal_len() > 0 {
        writeln!(f, "{}\tPrincipal: {}", pad, String::from_utf8_lossy(ace.principal_bytes()))?;
    } // if
    writeln!(f, "{}\tAccess Types: {:#04x}", pad, ace.access_types())?;
    writeln!(f, "{}\tFlags: {:#06x}", pad, ace.access_flags())?;
    writeln!(f, "{}\tAllow Permissions: {:#x}", pad, ace.allow_perms())?;
    writeln!(f, "{}\tAudit Permissions: {:#x}", pad, ace.audit_perms())?;
    writeln!(f, "{}\tAlarm Permissions: {:#x}", pad, ace.alarm_perms())
} // dump


// Tests //////////////////////////////////////////////////////////////////////////////////////////


// mod tests
