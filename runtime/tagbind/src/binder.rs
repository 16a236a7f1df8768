use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use jiff::tz::TimeZone;
use serde::Serialize;
use serde::de::DeserializeOwned;
use ubyte::{ByteUnit, ToByteUnit};

use crate::binding::{
    BindArray, BindBody, BindRequest, BindUri, FormBinding, FormMultipartBinding, FormPostBinding,
    JsonBinding, MsgPackBinding, QueryBinding, Strategy, XmlBinding, YamlBinding,
};
use crate::config::BinderConfig;
use crate::config::errors::UnknownTimeZone;
use crate::errors::{BindError, SizeLimitExceeded, StrategyUnavailable};
use crate::field::Bind;
use crate::form_values::FormValues;
use crate::registry::Registry;
use crate::request::RequestHead;
use crate::validation::{NoValidation, StructValidator};
use crate::value::Value;

/// The entry point for binding: it owns the converter [`Registry`], the validator,
/// the body size limit and the fallback time zone, and hands them to the adapters.
///
/// A `Binder` is cheap to clone and can be shared across threads.
///
/// ```rust
/// use tagbind::{Bind, Binder, request::RequestHead};
///
/// #[derive(Bind, Default, serde::Serialize, serde::Deserialize)]
/// struct Login {
///     #[bind(form = "user")]
///     user: String,
///     #[bind(form = "remember,default=false")]
///     remember: bool,
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (head, _) = http::Request::post("/login")
///     .header("content-type", "application/json")
///     .body(())?
///     .into_parts();
/// let mut login = Login::default();
/// Binder::new().bind(&RequestHead::from(head), br#"{"user": "ada"}"#, &mut login)?;
/// assert_eq!(login.user, "ada");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Binder {
    registry: Arc<Registry>,
    validator: Arc<dyn StructValidator>,
    max_body_size: ByteUnit,
    time_zone: TimeZone,
}

/// What an adapter needs to know about the [`Binder`] that invoked it.
#[derive(Clone, Copy)]
pub struct BindContext<'a> {
    pub registry: &'a Registry,
    pub validator: &'a dyn StructValidator,
    /// The zone of time inputs that carry no offset and whose field declares no zone.
    pub time_zone: &'a TimeZone,
    pub max_body_size: ByteUnit,
}

impl BindContext<'_> {
    /// Fill the defaults declared on the `form` tags of `target`.
    pub fn inject_defaults(&self, target: &mut dyn Bind) -> Result<(), BindError> {
        crate::defaults::inject_defaults(target, "form", self.registry, self.time_zone)
    }

    /// Hand a freshly-bound `target` to the validator.
    pub fn validate<T: Any>(&self, target: &T) -> Result<(), BindError> {
        self.validator.validate_struct(target)?;
        Ok(())
    }

    /// Reject bodies above the size limit.
    pub fn check_body_size(&self, body: &[u8]) -> Result<(), SizeLimitExceeded> {
        if body.len() as u64 > self.max_body_size.as_u64() {
            return Err(SizeLimitExceeded {
                max_size: self.max_body_size,
                actual: body.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for BindContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindContext")
            .field("registry", self.registry)
            .field("time_zone", self.time_zone)
            .field("max_body_size", &self.max_body_size)
            .finish_non_exhaustive()
    }
}

impl Binder {
    /// A binder with the built-in converters, no validation, a 2 MB body limit
    /// and the system time zone as fallback.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry::with_builtins()),
            validator: Arc::new(NoValidation),
            max_body_size: 2.megabytes(),
            time_zone: TimeZone::system(),
        }
    }

    /// A binder configured according to `config`.
    ///
    /// It fails if the configured default time zone is unknown.
    pub fn from_config(config: &BinderConfig) -> Result<Self, UnknownTimeZone> {
        Ok(Self {
            max_body_size: config.max_body_size,
            time_zone: config.time_zone()?,
            ..Self::new()
        })
    }

    /// Use `registry` to look up converters.
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    /// Validate every bound target with `validator`.
    pub fn with_validator<V: StructValidator + 'static>(mut self, validator: V) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn with_time_zone(mut self, time_zone: TimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn with_max_body_size(mut self, max_body_size: ByteUnit) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// The converter registry. Converters registered here are visible to ongoing binds.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn context(&self) -> BindContext<'_> {
        BindContext {
            registry: &self.registry,
            validator: self.validator.as_ref(),
            time_zone: &self.time_zone,
            max_body_size: self.max_body_size,
        }
    }

    /// Bind a request onto `target`, picking the strategy via [`Strategy::negotiate`].
    ///
    /// Protobuf bodies can't be negotiated: they fail with [`StrategyUnavailable`].
    /// Use [`ProtoBufBinding`](crate::binding::ProtoBufBinding) with [`Binder::bind_with`].
    pub fn bind<T>(&self, head: &RequestHead, body: &[u8], target: &mut T) -> Result<(), BindError>
    where
        T: Bind + Serialize + DeserializeOwned,
    {
        let strategy = Strategy::negotiate(&head.method, head.content_type());
        match strategy {
            Strategy::Json => self.bind_with(&JsonBinding, head, body, target),
            Strategy::Xml => self.bind_with(&XmlBinding, head, body, target),
            Strategy::Yaml => self.bind_with(&YamlBinding, head, body, target),
            Strategy::MsgPack => self.bind_with(&MsgPackBinding, head, body, target),
            Strategy::Form => self.bind_with(&FormBinding, head, body, target),
            Strategy::Query => self.bind_with(&QueryBinding, head, body, target),
            Strategy::FormPost => self.bind_with(&FormPostBinding, head, body, target),
            Strategy::FormMultipart => self.bind_with(&FormMultipartBinding, head, body, target),
            Strategy::ProtoBuf | Strategy::Uri | Strategy::Array => {
                let e = StrategyUnavailable {
                    strategy: strategy.name(),
                };
                tracing::debug!(error.msg = %e, error.details = ?e, "Content negotiation failed");
                Err(e.into())
            }
        }
    }

    /// Bind a request onto `target` with a specific adapter.
    pub fn bind_with<B, T>(
        &self,
        binding: &B,
        head: &RequestHead,
        body: &[u8],
        target: &mut T,
    ) -> Result<(), BindError>
    where
        B: BindRequest<T>,
    {
        let cx = self.context();
        cx.check_body_size(body)?;
        tracing::debug!(binding = binding.name(), body.len = body.len(), "Binding request");
        binding
            .bind(&cx, head, body, target)
            .inspect_err(|e| log_failure(binding.name(), e))
    }

    /// Bind a raw payload onto `target`.
    pub fn bind_body<B, T>(&self, binding: &B, body: &[u8], target: &mut T) -> Result<(), BindError>
    where
        B: BindBody<T>,
    {
        let cx = self.context();
        cx.check_body_size(body)?;
        tracing::debug!(binding = binding.name(), body.len = body.len(), "Binding body");
        binding
            .bind_body(&cx, body, target)
            .inspect_err(|e| log_failure(binding.name(), e))
    }

    /// Bind path parameters onto `target`.
    pub fn bind_uri<B, T>(&self, binding: &B, params: &FormValues, target: &mut T) -> Result<(), BindError>
    where
        B: BindUri<T>,
    {
        tracing::debug!(binding = binding.name(), "Binding path parameters");
        binding
            .bind_uri(&self.context(), params, target)
            .inspect_err(|e| log_failure(binding.name(), e))
    }

    /// Bind a map of dynamic values onto `target`.
    pub fn bind_array<B, T>(
        &self,
        binding: &B,
        source: &IndexMap<String, Value>,
        target: &mut T,
    ) -> Result<(), BindError>
    where
        B: BindArray<T>,
    {
        tracing::debug!(binding = binding.name(), "Binding dynamic values");
        binding
            .bind_array(&self.context(), source, target)
            .inspect_err(|e| log_failure(binding.name(), e))
    }
}

fn log_failure(binding: &'static str, e: &BindError) {
    tracing::debug!(binding, error.msg = %e, error.details = ?e, "Binding failed");
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("registry", &self.registry)
            .field("max_body_size", &self.max_body_size)
            .field("time_zone", &self.time_zone)
            .finish_non_exhaustive()
    }
}
