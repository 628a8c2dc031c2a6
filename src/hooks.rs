//! Extension points for deployment-specific customization
//!
//! Instead of runtime-registered callbacks keyed by name, customization is
//! an injected strategy trait with a no-op default. Callers that need to
//! tweak engine options or annotate signatures supply their own
//! implementation when constructing the [`CryptoManager`](crate::CryptoManager).

use crate::engine::{EngineOptions, KeyInfo, Operation, SignatureRecord};

pub trait CryptoHooks: Send + Sync {
    /// Called before every engine call with the operation and the default
    /// option set. Returning `Some` replaces the defaults wholesale;
    /// returning `None` keeps them.
    fn adjust_options(&self, _op: Operation, _defaults: &EngineOptions) -> Option<EngineOptions> {
        None
    }

    /// Called once per interpreted signature with the record and its
    /// resolved key (if any). Returned lines are appended to that
    /// signature's detail output.
    fn augment_signature_detail(
        &self,
        _record: &SignatureRecord,
        _key: Option<&KeyInfo>,
    ) -> Vec<String> {
        Vec::new()
    }
}

/// Default hooks: no adjustments, no extra detail.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl CryptoHooks for NoopHooks {}
