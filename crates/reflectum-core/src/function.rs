//! Gated, typed invocables bound to a metaclass.

use std::fmt;
use std::sync::Arc;

use crate::error::Error;
use crate::kind::Kind;
use crate::object::ObjectHandle;
use crate::property::Predicate;
use crate::value::Value;

/// Erased function body over an object handle.
pub type FunctionBody = Arc<dyn Fn(&mut ObjectHandle, &[Value]) -> Result<Value, Error>>;

/// A named invocable exposed by a metaclass.
///
/// Callability is gated like property access: a static flag AND a dynamic
/// per-object predicate, both of which must hold.
pub struct Function {
    owner: String,
    name: String,
    return_kind: Kind,
    params: Vec<Kind>,
    callable: bool,
    callable_if: Option<Predicate>,
    body: FunctionBody,
}

impl Function {
    /// Create a callable function.
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        return_kind: Kind,
        params: Vec<Kind>,
        body: impl Fn(&mut ObjectHandle, &[Value]) -> Result<Value, Error> + 'static,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            return_kind,
            params,
            callable: true,
            callable_if: None,
            body: Arc::new(body),
        }
    }

    /// Set the static callable flag.
    pub fn with_callable(mut self, callable: bool) -> Self {
        self.callable = callable;
        self
    }

    /// Attach a dynamic call gate.
    pub fn with_callable_if(mut self, predicate: impl Fn(&ObjectHandle) -> bool + 'static) -> Self {
        self.callable_if = Some(Arc::new(predicate));
        self
    }

    /// Function name, unique within its owner class.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the owner class.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Declared return kind.
    pub fn return_kind(&self) -> Kind {
        self.return_kind
    }

    /// Declared parameter kinds, in order.
    pub fn params(&self) -> &[Kind] {
        &self.params
    }

    /// Call gate: static flag AND dynamic predicate.
    pub fn callable(&self, object: &ObjectHandle) -> bool {
        self.callable && self.callable_if.as_ref().is_none_or(|p| p(object))
    }

    /// Invoke the function.
    ///
    /// Validates callability first ([`Error::ForbiddenCall`]), then the
    /// argument count against the declared parameter count
    /// ([`Error::NotEnoughArguments`]); extra arguments are passed through.
    pub fn call(&self, object: &mut ObjectHandle, args: &[Value]) -> Result<Value, Error> {
        if !self.callable(object) {
            return Err(Error::ForbiddenCall {
                class: self.owner.clone(),
                function: self.name.clone(),
            });
        }
        if args.len() < self.params.len() {
            return Err(Error::NotEnoughArguments {
                function: self.name.clone(),
                expected: self.params.len(),
                got: args.len(),
            });
        }
        (self.body)(object, args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("return_kind", &self.return_kind)
            .field("params", &self.params)
            .field("callable", &self.callable)
            .finish_non_exhaustive()
    }
}
