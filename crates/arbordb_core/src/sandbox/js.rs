//! JavaScript sandbox on the embedded `boa_engine` runtime.

use super::{Emission, EvaluationError, Sandbox};
use crate::config::SandboxLimits;
use arbordb_codec::Document;
use boa_engine::{Context, Source};
use serde_json::Value as Json;

/// Runs mapping functions as JavaScript.
///
/// Every call builds a brand-new [`Context`], so functions cannot keep state
/// between siblings. The context has only the ECMAScript builtins: no
/// console, no filesystem, no network. The document is handed over as JSON
/// text for `JSON.parse` and the result comes back through `JSON.stringify`,
/// so the only values crossing the boundary are plain JSON.
///
/// The source may be an arrow function or a function expression:
///
/// ```rust
/// use arbordb_codec::Document;
/// use arbordb_core::{JsSandbox, Sandbox};
///
/// let sandbox = JsSandbox::default();
/// let doc = Document::new("movies/matrix").with("name", "Matrix");
/// let emission = sandbox
///     .evaluate(&doc, "(doc) => [doc.name, {b: doc.id}]")
///     .unwrap()
///     .unwrap();
/// assert_eq!(emission.key, "Matrix");
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsSandbox {
    limits: SandboxLimits,
}

impl JsSandbox {
    /// Creates a sandbox enforcing the given limits.
    #[must_use]
    pub fn new(limits: SandboxLimits) -> Self {
        Self { limits }
    }

    /// The limits installed on every context.
    #[must_use]
    pub fn limits(&self) -> SandboxLimits {
        self.limits
    }

    fn fresh_context(&self) -> Context {
        let mut context = Context::default();
        let limits = context.runtime_limits_mut();
        limits.set_loop_iteration_limit(self.limits.loop_iteration_limit);
        limits.set_recursion_limit(self.limits.recursion_limit);
        context
    }
}

/// Wraps the user function so the script yields either `null` or the
/// JSON text of a validated `[key, value]` pair.
///
/// `document_literal` is the document's JSON text quoted as a string
/// literal, so keys such as `__proto__` stay own properties.
fn wrap_source(source: &str, document_literal: &str) -> String {
    let function = source.trim().trim_end_matches(';').trim_end();
    format!(
        "(function () {{\n\
         const map = (\n{function}\n);\n\
         if (typeof map !== 'function') {{\n\
         throw new TypeError('index source must evaluate to a function');\n\
         }}\n\
         const result = map(JSON.parse({document_literal}));\n\
         if (result === null || result === undefined) {{\n\
         return null;\n\
         }}\n\
         if (!Array.isArray(result) || result.length !== 2) {{\n\
         throw new TypeError('index function must return null or a [key, value] pair');\n\
         }}\n\
         return JSON.stringify([\n\
         result[0] === undefined ? null : result[0],\n\
         result[1] === undefined ? null : result[1],\n\
         ]);\n\
         }})()"
    )
}

fn decode_pair(encoded: &str) -> Result<Option<Emission>, EvaluationError> {
    let (key, value): (Json, Json) = serde_json::from_str(encoded)
        .map_err(|err| EvaluationError::new(format!("unreadable index result: {err}")))?;

    let key = match key {
        // Missing, null and non-finite keys all stringify to null.
        Json::Null => return Ok(None),
        Json::String(key) => key,
        Json::Number(number) => number.to_string(),
        other => {
            return Err(EvaluationError::new(format!(
                "emitted key must be a string or a number, got {other}"
            )));
        }
    };
    if key.is_empty() {
        return Ok(None);
    }

    let value = match value {
        Json::Null => Document::empty(),
        object @ Json::Object(_) => Document::from_json_value(object)
            .map_err(|err| EvaluationError::new(format!("unreadable emitted value: {err}")))?,
        other => {
            return Err(EvaluationError::new(format!(
                "emitted value must be an object, got {other}"
            )));
        }
    };

    Ok(Some(Emission { key, value }))
}

impl Sandbox for JsSandbox {
    fn evaluate(
        &self,
        document: &Document,
        source: &str,
    ) -> Result<Option<Emission>, EvaluationError> {
        let document_literal = serde_json::to_string(document)
            .and_then(|json| serde_json::to_string(&json))
            .map_err(|err| EvaluationError::new(format!("cannot encode document: {err}")))?;
        let script = wrap_source(source, &document_literal);

        let mut context = self.fresh_context();
        let result = context
            .eval(Source::from_bytes(&script))
            .map_err(|err| EvaluationError::new(err.to_string()))?;

        if result.is_null() || result.is_undefined() {
            return Ok(None);
        }
        match result.as_string() {
            Some(encoded) => decode_pair(&encoded.to_std_string_escaped()),
            None => Err(EvaluationError::new(
                "index function produced a non-serializable result",
            )),
        }
    }
}
