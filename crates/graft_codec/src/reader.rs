//! Schema-driven field reader.

use graft_foundation::{
    Diagnostic, Error, ErrorKind, FieldSchema, FieldType, Guid, LtMap, LtVec, Name, RecordSchema,
    Reference, ReferenceTables, Result, TypeName, Value,
};
use tracing::{debug, trace, warn};

use crate::bytes::ByteReader;
use crate::refs::ReferenceDecoder;
use crate::skip::{SkipContext, SkipPredicate};
use crate::tag::ReferenceTag;

/// Largest element count accepted for elements that occupy no bytes.
pub const MAX_ZERO_WIDTH_ELEMENTS: usize = 1 << 16;

/// Outcome of reading one top-level field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldRead {
    /// The skip predicate left the field out of the stream.
    Skipped,
    /// The stream ended before this field. Buffers written against an older
    /// schema end early; the field keeps its default.
    Absent,
    /// A decoded value.
    Value(Value),
    /// The value held an object reference that did not resolve. The field
    /// should be left at its default.
    Unresolved,
}

/// Decodes one object's fields from a buffer.
///
/// Per-field failures (unresolved GUIDs, missing resources) are collected as
/// diagnostics. Malformed bytes are returned as errors.
pub struct ValueReader<'a> {
    input: ByteReader<'a>,
    tables: &'a ReferenceTables,
    refs: &'a mut dyn ReferenceDecoder,
    skip: &'a dyn SkipPredicate,
    object: Option<Guid>,
    poisoned: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ValueReader<'a> {
    /// Creates a reader over one object buffer.
    pub fn new(
        input: &'a [u8],
        tables: &'a ReferenceTables,
        refs: &'a mut dyn ReferenceDecoder,
        skip: &'a dyn SkipPredicate,
    ) -> Self {
        Self {
            input: ByteReader::new(input),
            tables,
            refs,
            skip,
            object: None,
            poisoned: false,
            diagnostics: Vec::new(),
        }
    }

    /// Tags diagnostics with the GUID of the object being read.
    #[must_use]
    pub fn at_object(mut self, guid: Guid) -> Self {
        self.object = Some(guid);
        self
    }

    /// Reads a top-level field.
    ///
    /// # Errors
    ///
    /// Returns a corrupt payload error if the bytes do not decode as the
    /// declared type.
    pub fn read_field(&mut self, owner: &TypeName, field: &FieldSchema) -> Result<FieldRead> {
        let ctx = SkipContext {
            field,
            owner,
            top_level: true,
        };
        if self.skip.skip(&ctx) {
            return Ok(FieldRead::Skipped);
        }
        if self.input.is_at_end() {
            trace!(owner = %owner, field = %field.name, "buffer ended before field");
            return Ok(FieldRead::Absent);
        }
        self.poisoned = false;
        let value = self.read_value(&field.name, &field.ty)?;
        if self.poisoned {
            Ok(FieldRead::Unresolved)
        } else {
            trace!(owner = %owner, field = %field.name, "read");
            Ok(FieldRead::Value(value))
        }
    }

    fn read_value(&mut self, field: &Name, ty: &FieldType) -> Result<Value> {
        Ok(match ty {
            FieldType::Bool => Value::Bool(self.input.read_bool()?),
            FieldType::Int => Value::Int(self.input.read_i64()?),
            FieldType::Float => Value::Float(self.input.read_f64()?),
            FieldType::String => Value::String(self.input.read_str()?.into()),
            FieldType::Name => Value::Name(self.name_at()?),
            FieldType::List(elem) => {
                let count = self.read_count(self.min_width(elem))?;
                let mut items = LtVec::new();
                for _ in 0..count {
                    items = items.push_back(self.read_value(field, elem)?);
                }
                Value::List(items)
            }
            FieldType::Map(key_ty, value_ty) => {
                let count = self.read_count(self.min_width(key_ty) + self.min_width(value_ty))?;
                let mut entries = LtMap::new();
                for _ in 0..count {
                    let k = self.read_value(field, key_ty)?;
                    let v = self.read_value(field, value_ty)?;
                    entries = entries.insert(k, v);
                }
                Value::Map(entries)
            }
            FieldType::Record(schema) => Value::Record(self.read_record(schema)?),
            FieldType::Reference => self.read_reference(field)?,
        })
    }

    /// Reads an element count and checks that `count` elements of at least
    /// `width` bytes each fit in what is left of the buffer.
    fn read_count(&mut self, width: usize) -> Result<usize> {
        let count = usize::try_from(self.input.read_u32()?)
            .map_err(|_| Error::corrupt("element count does not fit in memory"))?;
        let fits = if width == 0 {
            count <= MAX_ZERO_WIDTH_ELEMENTS
        } else {
            count <= self.input.remaining() / width
        };
        if !fits {
            return Err(Error::corrupt(format!(
                "element count {count} exceeds the remaining {} bytes",
                self.input.remaining()
            )));
        }
        Ok(count)
    }

    /// Fewest bytes one value of `ty` occupies in the stream.
    fn min_width(&self, ty: &FieldType) -> usize {
        match ty {
            FieldType::Bool | FieldType::Reference => 1,
            FieldType::Int | FieldType::Float => 8,
            FieldType::String | FieldType::Name | FieldType::List(_) | FieldType::Map(..) => 4,
            FieldType::Record(schema) => schema
                .fields
                .iter()
                .filter(|member| {
                    !self.skip.skip(&SkipContext {
                        field: member,
                        owner: &schema.name,
                        top_level: false,
                    })
                })
                .map(|member| self.min_width(&member.ty))
                .sum(),
        }
    }

    fn read_record(&mut self, schema: &RecordSchema) -> Result<LtMap<Name, Value>> {
        let mut members = LtMap::new();
        for member in &schema.fields {
            let ctx = SkipContext {
                field: member,
                owner: &schema.name,
                top_level: false,
            };
            let value = if self.skip.skip(&ctx) {
                member.default_value()
            } else {
                self.read_value(&member.name, &member.ty)?
            };
            members = members.insert(member.name.clone(), value);
        }
        Ok(members)
    }

    fn read_reference(&mut self, field: &Name) -> Result<Value> {
        let tag = ReferenceTag::from_byte(self.input.read_u8()?)?;
        Ok(match tag {
            ReferenceTag::None => Value::Nil,
            ReferenceTag::ExternalResource => {
                let idx = self.input.read_u32()?;
                let path = self
                    .tables
                    .resource(idx)
                    .cloned()
                    .ok_or_else(|| bad_index("resource", idx))?;
                if self.refs.resolve_resource(&path) {
                    Value::Ref(Reference::Resource(path))
                } else {
                    warn!(field = %field, resource = %path, "missing external resource");
                    self.report(ErrorKind::MissingExternalResource(path), field);
                    Value::Nil
                }
            }
            ReferenceTag::TypeDescriptor => {
                let idx = self.input.read_u32()?;
                let name = self
                    .tables
                    .type_name(idx)
                    .cloned()
                    .ok_or_else(|| bad_index("type", idx))?;
                Value::Ref(Reference::Type(name))
            }
            ReferenceTag::NamedMember => {
                let type_idx = self.input.read_u32()?;
                let owner = self
                    .tables
                    .type_name(type_idx)
                    .cloned()
                    .ok_or_else(|| bad_index("type", type_idx))?;
                let member = self.name_at()?;
                Value::Ref(Reference::Member { owner, member })
            }
            ReferenceTag::ObjectReference => {
                let guid = self.input.read_guid()?;
                if let Some(id) = self.refs.decode_guid(guid) {
                    Value::object(id)
                } else {
                    warn!(field = %field, guid = %guid, "unresolved object reference");
                    self.report(ErrorKind::UnresolvedReference(guid), field);
                    self.poisoned = true;
                    Value::Nil
                }
            }
            ReferenceTag::ForeignOpaque => {
                let handle = self.input.read_object_id()?;
                if let Some(id) = self.refs.decode_foreign(handle) {
                    Value::object(id)
                } else {
                    debug!(field = %field, handle = ?handle, "foreign reference no longer valid");
                    Value::Nil
                }
            }
        })
    }

    fn name_at(&mut self) -> Result<Name> {
        let idx = self.input.read_u32()?;
        self.tables
            .name(idx)
            .cloned()
            .ok_or_else(|| bad_index("name", idx))
    }

    fn report(&mut self, kind: ErrorKind, field: &Name) {
        self.diagnostics
            .push(Diagnostic::new(kind).at(self.object).on_field(field.clone()));
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.input.remaining()
    }

    /// Consumes the reader, returning its diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

fn bad_index(table: &str, idx: u32) -> Error {
    Error::corrupt(format!("{table} index {idx} is out of range"))
}
