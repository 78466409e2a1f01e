// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Constant pool codec for compiled JVM units.
//!
//! ```text
//! 0xCAFEBABE | minor | major | pool_count | pool[1..count] | body ...
//!                                  |                          |
//!                          parsed into Constant        kept verbatim
//! ```
//!
//! Only the constant pool is decoded. Edits repoint Class, NameAndType and
//! MethodType entries at Utf8 entries appended to the end of the pool.
//! Existing Utf8 entries are never rewritten, so every index the body refers
//! to keeps its text and the body is copied back unchanged.

use std::borrow::Cow;

use crate::error::ClassFileError;

const MAGIC: u32 = 0xCAFE_BABE;
const MAX_POOL_COUNT: usize = u16::MAX as usize;
const MAX_UTF8_LEN: usize = u16::MAX as usize;

/// Constant pool tags.
pub mod tag {
    pub const UTF8: u8 = 1;
    pub const INTEGER: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const LONG: u8 = 5;
    pub const DOUBLE: u8 = 6;
    pub const CLASS: u8 = 7;
    pub const STRING: u8 = 8;
    pub const FIELDREF: u8 = 9;
    pub const METHODREF: u8 = 10;
    pub const INTERFACE_METHODREF: u8 = 11;
    pub const NAME_AND_TYPE: u8 = 12;
    pub const METHOD_HANDLE: u8 = 15;
    pub const METHOD_TYPE: u8 = 16;
    pub const DYNAMIC: u8 = 17;
    pub const INVOKE_DYNAMIC: u8 = 18;
    pub const MODULE: u8 = 19;
    pub const PACKAGE: u8 = 20;
}

/// Kind of a member reference constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Method,
    InterfaceMethod,
}

/// One constant pool entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    /// Index 0 and the slot after a `Long` or `Double`.
    Unusable,
    /// Raw modified UTF-8 payload.
    Utf8(Vec<u8>),
    Integer(u32),
    Float(u32),
    Long(u64),
    Double(u64),
    Class {
        name_index: u16,
    },
    String {
        string_index: u16,
    },
    MemberRef {
        kind: MemberKind,
        class_index: u16,
        name_and_type_index: u16,
    },
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    MethodHandle {
        reference_kind: u8,
        reference_index: u16,
    },
    MethodType {
        descriptor_index: u16,
    },
    Dynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
    InvokeDynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
    Module {
        name_index: u16,
    },
    Package {
        name_index: u16,
    },
}

impl Constant {
    fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            Self::Unusable => {}
            Self::Utf8(bytes) => {
                out.push(tag::UTF8);
                // Length is checked when the entry is created.
                out.extend_from_slice(&u16::try_from(bytes.len()).unwrap_or(u16::MAX).to_be_bytes());
                out.extend_from_slice(bytes);
            }
            Self::Integer(value) => {
                out.push(tag::INTEGER);
                out.extend_from_slice(&value.to_be_bytes());
            }
            Self::Float(value) => {
                out.push(tag::FLOAT);
                out.extend_from_slice(&value.to_be_bytes());
            }
            Self::Long(value) => {
                out.push(tag::LONG);
                out.extend_from_slice(&value.to_be_bytes());
            }
            Self::Double(value) => {
                out.push(tag::DOUBLE);
                out.extend_from_slice(&value.to_be_bytes());
            }
            Self::Class { name_index } => write_u2_entry(out, tag::CLASS, *name_index),
            Self::String { string_index } => write_u2_entry(out, tag::STRING, *string_index),
            Self::MemberRef {
                kind,
                class_index,
                name_and_type_index,
            } => {
                let tag = match kind {
                    MemberKind::Field => tag::FIELDREF,
                    MemberKind::Method => tag::METHODREF,
                    MemberKind::InterfaceMethod => tag::INTERFACE_METHODREF,
                };
                write_u2_pair(out, tag, *class_index, *name_and_type_index);
            }
            Self::NameAndType {
                name_index,
                descriptor_index,
            } => write_u2_pair(out, tag::NAME_AND_TYPE, *name_index, *descriptor_index),
            Self::MethodHandle {
                reference_kind,
                reference_index,
            } => {
                out.push(tag::METHOD_HANDLE);
                out.push(*reference_kind);
                out.extend_from_slice(&reference_index.to_be_bytes());
            }
            Self::MethodType { descriptor_index } => {
                write_u2_entry(out, tag::METHOD_TYPE, *descriptor_index);
            }
            Self::Dynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            } => write_u2_pair(
                out,
                tag::DYNAMIC,
                *bootstrap_method_attr_index,
                *name_and_type_index,
            ),
            Self::InvokeDynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            } => write_u2_pair(
                out,
                tag::INVOKE_DYNAMIC,
                *bootstrap_method_attr_index,
                *name_and_type_index,
            ),
            Self::Module { name_index } => write_u2_entry(out, tag::MODULE, *name_index),
            Self::Package { name_index } => write_u2_entry(out, tag::PACKAGE, *name_index),
        }
    }
}

fn write_u2_entry(out: &mut Vec<u8>, tag: u8, value: u16) {
    out.push(tag);
    out.extend_from_slice(&value.to_be_bytes());
}

fn write_u2_pair(out: &mut Vec<u8>, tag: u8, first: u16, second: u16) {
    out.push(tag);
    out.extend_from_slice(&first.to_be_bytes());
    out.extend_from_slice(&second.to_be_bytes());
}

struct ClassReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ClassReader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8], ClassFileError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(ClassFileError::UnexpectedEof)?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_u1(&mut self) -> Result<u8, ClassFileError> {
        Ok(self.read_slice(1)?[0])
    }

    fn read_u2(&mut self) -> Result<u16, ClassFileError> {
        let slice = self.read_slice(2)?;
        Ok(u16::from_be_bytes([slice[0], slice[1]]))
    }

    fn read_u4(&mut self) -> Result<u32, ClassFileError> {
        let slice = self.read_slice(4)?;
        Ok(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
    }

    fn read_u8(&mut self) -> Result<u64, ClassFileError> {
        let high = u64::from(self.read_u4()?);
        let low = u64::from(self.read_u4()?);
        Ok((high << 32) | low)
    }

    fn rest(&self) -> &'a [u8] {
        &self.bytes[self.offset..]
    }
}

/// A compiled unit with a decoded constant pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFile {
    minor_version: u16,
    major_version: u16,
    /// `pool[0]` is the unusable zero slot.
    pool: Vec<Constant>,
    body: Vec<u8>,
}

impl ClassFile {
    /// Parses the header and constant pool of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMagic`, `UnexpectedEof` or `UnsupportedConstant`
    /// for malformed input.
    pub fn parse(bytes: &[u8]) -> Result<Self, ClassFileError> {
        let mut reader = ClassReader::new(bytes);
        if reader.read_u4()? != MAGIC {
            return Err(ClassFileError::InvalidMagic);
        }
        let minor_version = reader.read_u2()?;
        let major_version = reader.read_u2()?;

        let count = reader.read_u2()?;
        let mut pool = Vec::with_capacity(usize::from(count));
        pool.push(Constant::Unusable);

        let mut index: u16 = 1;
        while index < count {
            let tag = reader.read_u1()?;
            let constant = match tag {
                tag::UTF8 => {
                    let len = usize::from(reader.read_u2()?);
                    Constant::Utf8(reader.read_slice(len)?.to_vec())
                }
                tag::INTEGER => Constant::Integer(reader.read_u4()?),
                tag::FLOAT => Constant::Float(reader.read_u4()?),
                tag::LONG => Constant::Long(reader.read_u8()?),
                tag::DOUBLE => Constant::Double(reader.read_u8()?),
                tag::CLASS => Constant::Class {
                    name_index: reader.read_u2()?,
                },
                tag::STRING => Constant::String {
                    string_index: reader.read_u2()?,
                },
                tag::FIELDREF | tag::METHODREF | tag::INTERFACE_METHODREF => {
                    let kind = match tag {
                        tag::FIELDREF => MemberKind::Field,
                        tag::METHODREF => MemberKind::Method,
                        _ => MemberKind::InterfaceMethod,
                    };
                    Constant::MemberRef {
                        kind,
                        class_index: reader.read_u2()?,
                        name_and_type_index: reader.read_u2()?,
                    }
                }
                tag::NAME_AND_TYPE => Constant::NameAndType {
                    name_index: reader.read_u2()?,
                    descriptor_index: reader.read_u2()?,
                },
                tag::METHOD_HANDLE => Constant::MethodHandle {
                    reference_kind: reader.read_u1()?,
                    reference_index: reader.read_u2()?,
                },
                tag::METHOD_TYPE => Constant::MethodType {
                    descriptor_index: reader.read_u2()?,
                },
                tag::DYNAMIC => Constant::Dynamic {
                    bootstrap_method_attr_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                tag::INVOKE_DYNAMIC => Constant::InvokeDynamic {
                    bootstrap_method_attr_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                tag::MODULE => Constant::Module {
                    name_index: reader.read_u2()?,
                },
                tag::PACKAGE => Constant::Package {
                    name_index: reader.read_u2()?,
                },
                _ => return Err(ClassFileError::UnsupportedConstant { tag, index }),
            };

            let wide = matches!(constant, Constant::Long(_) | Constant::Double(_));
            pool.push(constant);
            index += 1;
            if wide {
                pool.push(Constant::Unusable);
                index = index.saturating_add(1);
            }
        }

        Ok(Self {
            minor_version,
            major_version,
            pool,
            body: reader.rest().to_vec(),
        })
    }

    /// Serializes the unit.
    ///
    /// # Errors
    ///
    /// Returns `PoolOverflow` if edits grew the pool past 65535 slots.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ClassFileError> {
        let count = u16::try_from(self.pool.len()).map_err(|_| ClassFileError::PoolOverflow {
            count: self.pool.len(),
        })?;

        let mut out = Vec::with_capacity(self.body.len() + self.pool.len() * 8 + 10);
        out.extend_from_slice(&MAGIC.to_be_bytes());
        out.extend_from_slice(&self.minor_version.to_be_bytes());
        out.extend_from_slice(&self.major_version.to_be_bytes());
        out.extend_from_slice(&count.to_be_bytes());
        for constant in &self.pool {
            constant.write_to(&mut out);
        }
        out.extend_from_slice(&self.body);
        Ok(out)
    }

    #[must_use]
    pub const fn major_version(&self) -> u16 {
        self.major_version
    }

    #[must_use]
    pub const fn minor_version(&self) -> u16 {
        self.minor_version
    }

    /// Number of pool slots, including the zero slot.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pool.len()
    }

    /// Usable entries with their indices.
    pub fn entries(&self) -> impl Iterator<Item = (u16, &Constant)> {
        self.pool
            .iter()
            .enumerate()
            .filter(|(_, constant)| !matches!(constant, Constant::Unusable))
            .filter_map(|(index, constant)| Some((u16::try_from(index).ok()?, constant)))
    }

    /// Entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConstantIndex` for out-of-range or unusable slots.
    pub fn entry(&self, index: u16) -> Result<&Constant, ClassFileError> {
        match self.pool.get(usize::from(index)) {
            Some(Constant::Unusable) | None => Err(ClassFileError::InvalidConstantIndex { index }),
            Some(constant) => Ok(constant),
        }
    }

    fn entry_mut(&mut self, index: u16) -> Result<&mut Constant, ClassFileError> {
        match self.pool.get_mut(usize::from(index)) {
            Some(Constant::Unusable) | None => Err(ClassFileError::InvalidConstantIndex { index }),
            Some(constant) => Ok(constant),
        }
    }

    /// Decoded text of the Utf8 entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConstantIndex` if `index` is not a decodable Utf8 entry.
    pub fn utf8(&self, index: u16) -> Result<Cow<'_, str>, ClassFileError> {
        match self.entry(index)? {
            Constant::Utf8(bytes) => {
                decode_modified_utf8(bytes).ok_or(ClassFileError::InvalidConstantIndex { index })
            }
            _ => Err(ClassFileError::InvalidConstantIndex { index }),
        }
    }

    /// Internal name of the Class entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConstantIndex` if `index` is not a Class entry.
    pub fn class_name(&self, index: u16) -> Result<Cow<'_, str>, ClassFileError> {
        match self.entry(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            _ => Err(ClassFileError::InvalidConstantIndex { index }),
        }
    }

    /// Indices of every Class entry.
    #[must_use]
    pub fn class_indices(&self) -> Vec<u16> {
        self.indices_where(|c| matches!(c, Constant::Class { .. }))
    }

    /// Indices of every entry matching `predicate`.
    pub fn indices_where(&self, predicate: impl Fn(&Constant) -> bool) -> Vec<u16> {
        self.entries()
            .filter(|(_, constant)| predicate(constant))
            .map(|(index, _)| index)
            .collect()
    }

    /// Owner class, name and descriptor of the member reference at `index`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConstantIndex` if `index` is not a member reference.
    pub fn member_ref(
        &self,
        index: u16,
    ) -> Result<(Cow<'_, str>, Cow<'_, str>, Cow<'_, str>), ClassFileError> {
        let Constant::MemberRef {
            class_index,
            name_and_type_index,
            ..
        } = *self.entry(index)?
        else {
            return Err(ClassFileError::InvalidConstantIndex { index });
        };
        let (name_index, descriptor_index) = self.name_and_type(name_and_type_index)?;
        Ok((
            self.class_name(class_index)?,
            self.utf8(name_index)?,
            self.utf8(descriptor_index)?,
        ))
    }

    /// Name and descriptor indices of the NameAndType entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConstantIndex` if `index` is not a NameAndType entry.
    pub fn name_and_type(&self, index: u16) -> Result<(u16, u16), ClassFileError> {
        match *self.entry(index)? {
            Constant::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((name_index, descriptor_index)),
            _ => Err(ClassFileError::InvalidConstantIndex { index }),
        }
    }

    /// Appends a new Utf8 entry.
    ///
    /// # Errors
    ///
    /// Returns `StringTooLong` or `PoolOverflow`.
    pub fn add_utf8(&mut self, value: &str) -> Result<u16, ClassFileError> {
        let bytes = encode_modified_utf8(value)?;
        self.push(Constant::Utf8(bytes))
    }

    /// Index of a Utf8 entry holding `value`, appending one if none exists.
    ///
    /// # Errors
    ///
    /// Returns `StringTooLong` or `PoolOverflow`.
    pub fn find_or_add_utf8(&mut self, value: &str) -> Result<u16, ClassFileError> {
        let bytes = encode_modified_utf8(value)?;
        if let Some((index, _)) = self
            .entries()
            .find(|(_, c)| matches!(c, Constant::Utf8(existing) if *existing == bytes))
        {
            return Ok(index);
        }
        self.push(Constant::Utf8(bytes))
    }

    /// Index of a NameAndType entry with these operands, appending one if
    /// none exists.
    ///
    /// # Errors
    ///
    /// Returns `PoolOverflow`.
    pub fn find_or_add_name_and_type(
        &mut self,
        name_index: u16,
        descriptor_index: u16,
    ) -> Result<u16, ClassFileError> {
        let wanted = Constant::NameAndType {
            name_index,
            descriptor_index,
        };
        if let Some((index, _)) = self.entries().find(|(_, c)| **c == wanted) {
            return Ok(index);
        }
        self.push(wanted)
    }

    fn push(&mut self, constant: Constant) -> Result<u16, ClassFileError> {
        if self.pool.len() >= MAX_POOL_COUNT {
            return Err(ClassFileError::PoolOverflow {
                count: self.pool.len() + 1,
            });
        }
        let index = u16::try_from(self.pool.len()).map_err(|_| ClassFileError::PoolOverflow {
            count: self.pool.len() + 1,
        })?;
        self.pool.push(constant);
        Ok(index)
    }

    /// Points one Utf8 operand of the entry at `owner` at text `value`.
    ///
    /// The Utf8 previously referenced is never edited: fields, methods and
    /// attributes in the body may refer to it by index.
    fn retarget_utf8(
        &mut self,
        owner: u16,
        value: &str,
        set: impl FnOnce(&mut Constant, u16),
    ) -> Result<(), ClassFileError> {
        let new_index = self.find_or_add_utf8(value)?;
        set(self.entry_mut(owner)?, new_index);
        Ok(())
    }

    /// Renames the class named by the Class entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConstantIndex` if `index` is not a Class entry, or
    /// the errors of [`ClassFile::add_utf8`].
    pub fn rename_class_entry(&mut self, index: u16, new_name: &str) -> Result<(), ClassFileError> {
        if !matches!(self.entry(index)?, Constant::Class { .. }) {
            return Err(ClassFileError::InvalidConstantIndex { index });
        }
        self.retarget_utf8(index, new_name, |c, new_index| {
            if let Constant::Class { name_index } = c {
                *name_index = new_index;
            }
        })
    }

    /// Replaces the descriptor of a NameAndType or MethodType entry.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConstantIndex` for other entry kinds, or the errors
    /// of [`ClassFile::add_utf8`].
    pub fn set_descriptor(&mut self, index: u16, descriptor: &str) -> Result<(), ClassFileError> {
        if !matches!(
            self.entry(index)?,
            Constant::NameAndType { .. } | Constant::MethodType { .. }
        ) {
            return Err(ClassFileError::InvalidConstantIndex { index });
        }
        self.retarget_utf8(index, descriptor, |c, new_index| match c {
            Constant::NameAndType {
                descriptor_index, ..
            }
            | Constant::MethodType { descriptor_index } => *descriptor_index = new_index,
            _ => {}
        })
    }

    /// Renames the member referenced by the Fieldref/Methodref at `ref_index`.
    ///
    /// The reference is pointed at a NameAndType with the new name and the
    /// old descriptor. Existing NameAndType entries are never edited, since
    /// other references may share them.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConstantIndex` if `ref_index` is not a member
    /// reference, or `PoolOverflow`/`StringTooLong` when appending fails.
    pub fn rename_member_entry(&mut self, ref_index: u16, new_name: &str) -> Result<(), ClassFileError> {
        let Constant::MemberRef {
            name_and_type_index,
            ..
        } = *self.entry(ref_index)?
        else {
            return Err(ClassFileError::InvalidConstantIndex { index: ref_index });
        };
        let (_, descriptor_index) = self.name_and_type(name_and_type_index)?;

        let name_index = self.find_or_add_utf8(new_name)?;
        let new_nat = self.find_or_add_name_and_type(name_index, descriptor_index)?;
        if let Constant::MemberRef {
            name_and_type_index,
            ..
        } = self.entry_mut(ref_index)?
        {
            *name_and_type_index = new_nat;
        }
        Ok(())
    }
}

/// Decodes modified UTF-8, returning `None` for malformed input.
#[must_use]
pub fn decode_modified_utf8(bytes: &[u8]) -> Option<Cow<'_, str>> {
    // Plain ASCII without NUL is the overwhelmingly common case.
    if bytes.iter().all(|b| *b != 0 && b.is_ascii()) {
        return std::str::from_utf8(bytes).ok().map(Cow::Borrowed);
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b0 = u16::from(bytes[i]);
        if b0 & 0x80 == 0 {
            if b0 == 0 {
                return None;
            }
            units.push(b0);
            i += 1;
        } else if b0 & 0xE0 == 0xC0 {
            let b1 = u16::from(*bytes.get(i + 1)?);
            units.push(((b0 & 0x1F) << 6) | (b1 & 0x3F));
            i += 2;
        } else if b0 & 0xF0 == 0xE0 {
            let b1 = u16::from(*bytes.get(i + 1)?);
            let b2 = u16::from(*bytes.get(i + 2)?);
            units.push(((b0 & 0x0F) << 12) | ((b1 & 0x3F) << 6) | (b2 & 0x3F));
            i += 3;
        } else {
            return None;
        }
    }
    String::from_utf16(&units).ok().map(Cow::Owned)
}

/// Encodes `value` as modified UTF-8.
///
/// # Errors
///
/// Returns `StringTooLong` if the encoding exceeds 65535 bytes.
pub fn encode_modified_utf8(value: &str) -> Result<Vec<u8>, ClassFileError> {
    let mut out = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit.to_be_bytes()[1]),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | ((unit >> 6) & 0x1F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | ((unit >> 12) & 0x0F) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    if out.len() > MAX_UTF8_LEN {
        return Err(ClassFileError::StringTooLong { len: out.len() });
    }
    Ok(out)
}
