//! Schema-driven field writer.

use graft_foundation::{
    Error, FieldSchema, FieldType, LtMap, Name, RecordSchema, Reference, ReferenceTables, Result, TypeName,
    Value,
};
use tracing::{debug, trace, warn};

use crate::bytes::ByteWriter;
use crate::refs::{ObjectEncoding, ReferenceEncoder};
use crate::skip::{SkipContext, SkipPredicate};
use crate::tag::ReferenceTag;

/// Encodes one object's fields into a buffer.
///
/// Interned values are written as indices into `tables`, adding entries as
/// needed. A value whose shape does not match its declared type is replaced
/// by the type's default so that the stream stays readable.
pub struct ValueWriter<'a> {
    out: ByteWriter,
    tables: &'a mut ReferenceTables,
    refs: &'a mut dyn ReferenceEncoder,
    skip: &'a dyn SkipPredicate,
}

impl<'a> ValueWriter<'a> {
    /// Creates a writer for one object buffer.
    pub fn new(
        tables: &'a mut ReferenceTables,
        refs: &'a mut dyn ReferenceEncoder,
        skip: &'a dyn SkipPredicate,
    ) -> Self {
        Self {
            out: ByteWriter::new(),
            tables,
            refs,
            skip,
        }
    }

    /// Writes a top-level field.
    ///
    /// Returns `false` if the skip predicate left the field out.
    ///
    /// # Errors
    ///
    /// Returns an error if a reference table overflows.
    pub fn write_field(
        &mut self,
        owner: &TypeName,
        field: &FieldSchema,
        value: Option<&Value>,
    ) -> Result<bool> {
        let ctx = SkipContext {
            field,
            owner,
            top_level: true,
        };
        if self.skip.skip(&ctx) {
            trace!(owner = %owner, field = %field.name, "skipped");
            return Ok(false);
        }
        let fallback;
        let value = if let Some(v) = value {
            v
        } else {
            fallback = field.default_value();
            &fallback
        };
        self.write_value(&field.name, &field.ty, value)?;
        Ok(true)
    }

    fn write_value(&mut self, field: &Name, ty: &FieldType, value: &Value) -> Result<()> {
        if !ty.accepts(value) {
            warn!(field = %field, expected = %ty, "value does not match declared type, writing default");
            let default = ty.default_value();
            return self.write_value(field, ty, &default);
        }
        match (ty, value) {
            (FieldType::Bool, Value::Bool(b)) => self.out.write_bool(*b),
            (FieldType::Int, Value::Int(i)) => self.out.write_i64(*i),
            (FieldType::Float, Value::Float(x)) => self.out.write_f64(*x),
            (FieldType::String, Value::String(s)) => self.out.write_str(s)?,
            (FieldType::Name, Value::Name(n)) => {
                let idx = self.tables.find_or_add_name(n)?;
                self.out.write_u32(idx);
            }
            (FieldType::List(elem), Value::List(items)) => {
                self.out.write_len(items.len())?;
                for item in items {
                    self.write_value(field, elem, item)?;
                }
            }
            (FieldType::Map(key_ty, value_ty), Value::Map(entries)) => {
                self.out.write_len(entries.len())?;
                for (k, v) in entries.iter() {
                    self.write_value(field, key_ty, k)?;
                    self.write_value(field, value_ty, v)?;
                }
            }
            (FieldType::Record(schema), Value::Record(members)) => {
                self.write_record(schema, members)?;
            }
            (FieldType::Reference, Value::Nil) => self.out.write_u8(ReferenceTag::None.byte()),
            (FieldType::Reference, Value::Ref(r)) => self.write_reference(field, r)?,
            _ => return Err(Error::internal(format!("{ty} accepted a value of another shape"))),
        }
        Ok(())
    }

    fn write_record(
        &mut self,
        schema: &RecordSchema,
        members: &LtMap<Name, Value>,
    ) -> Result<()> {
        for member in &schema.fields {
            let ctx = SkipContext {
                field: member,
                owner: &schema.name,
                top_level: false,
            };
            if self.skip.skip(&ctx) {
                continue;
            }
            match members.get(&member.name) {
                Some(v) => self.write_value(&member.name, &member.ty, v)?,
                None => {
                    let default = member.default_value();
                    self.write_value(&member.name, &member.ty, &default)?;
                }
            }
        }
        Ok(())
    }

    fn write_reference(&mut self, field: &Name, reference: &Reference) -> Result<()> {
        match reference {
            Reference::Resource(path) => {
                let idx = self.tables.find_or_add_resource(path)?;
                self.out.write_u8(ReferenceTag::ExternalResource.byte());
                self.out.write_u32(idx);
            }
            Reference::Type(name) => {
                let idx = self.tables.find_or_add_type(name)?;
                self.out.write_u8(ReferenceTag::TypeDescriptor.byte());
                self.out.write_u32(idx);
            }
            Reference::Member { owner, member } => {
                let type_idx = self.tables.find_or_add_type(owner)?;
                let name_idx = self.tables.find_or_add_name(member)?;
                self.out.write_u8(ReferenceTag::NamedMember.byte());
                self.out.write_u32(type_idx);
                self.out.write_u32(name_idx);
            }
            Reference::Object(id) => match self.refs.encode_object(*id) {
                ObjectEncoding::Guid(guid) => {
                    self.out.write_u8(ReferenceTag::ObjectReference.byte());
                    self.out.write_guid(guid);
                }
                ObjectEncoding::Foreign => {
                    self.out.write_u8(ReferenceTag::ForeignOpaque.byte());
                    self.out.write_object_id(*id);
                }
                ObjectEncoding::None => {
                    debug!(field = %field, object = ?id, "dropping reference to object outside the payload");
                    self.out.write_u8(ReferenceTag::None.byte());
                }
            },
        }
        Ok(())
    }

    /// Bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Consumes the writer, returning the object buffer.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.out.into_inner()
    }
}
