//! Input envelope for a single rule invocation.

use crate::context::Context;
use crate::descriptor::Descriptor;
use crate::identity::FileType;

/// Input for one rule invocation: one descriptor plus the run's context.
///
/// The descriptor is borrowed for the duration of the call, so a rule
/// cannot keep it past [`Rule::lint`](crate::Rule::lint).
#[derive(Debug, Clone)]
pub struct Request<'a> {
    descriptor: &'a dyn Descriptor,
    context: Context,
}

impl<'a> Request<'a> {
    /// Creates a new request.
    #[must_use]
    pub fn new(descriptor: &'a dyn Descriptor, context: Context) -> Self {
        Self {
            descriptor,
            context,
        }
    }

    /// Returns the descriptor under analysis.
    #[must_use]
    pub fn descriptor(&self) -> &'a dyn Descriptor {
        self.descriptor
    }

    /// Returns the descriptor's file type.
    #[must_use]
    pub fn file_type(&self) -> FileType {
        self.descriptor.file_type()
    }

    /// Returns the descriptor if it is a protobuf file.
    #[must_use]
    pub fn proto_file(&self) -> Option<&'a dyn Descriptor> {
        (self.descriptor.file_type() == FileType::ProtoFile).then_some(self.descriptor)
    }

    /// Returns the descriptor as the parser's concrete type `T`, if it is one.
    #[must_use]
    pub fn downcast<T: 'static>(&self) -> Option<&'a T> {
        self.descriptor.as_any().downcast_ref::<T>()
    }

    /// Returns the context for this invocation.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }
}
