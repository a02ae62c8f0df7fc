//! Request validation (spec §4.7 / spec.md §7): two independent checks —
//! the runtime must be one of the supported runtimes, and the model must be
//! allow-listed under the *requested* runtime only (spec §9).

use dispatch_registry::AllowList;
use dispatch_types::Error;

/// The runtimes this subsystem knows how to dispatch against.
const SUPPORTED_RUNTIMES: [&str; 2] = ["ollama", "vllm"];

/// Reject a request whose `runtime` is not supported, or whose `model_name`
/// is not present in `allow_list`'s entries for `runtime`. These are
/// independent checks: an unsupported runtime is rejected before the
/// allow-list is even consulted, so a garbage runtime never gets
/// misreported as an unsupported model.
pub fn validate(allow_list: &AllowList, model_name: &str, runtime: &str) -> crate::Result<()> {
    if !SUPPORTED_RUNTIMES.contains(&runtime) {
        return Err(Error::UnsupportedRuntime(runtime.to_string()));
    }

    if !allow_list.allows(model_name, runtime) {
        return Err(Error::UnsupportedModel(format!(
            "{model_name} is not allow-listed under runtime {runtime}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow_list() -> AllowList {
        AllowList::from_yaml("ollama:\n  - gemma2:9b\nvllm: []\n").unwrap()
    }

    #[test]
    fn accepts_listed_model_under_its_runtime() {
        assert!(validate(&allow_list(), "gemma2:9b", "ollama").is_ok());
    }

    #[test]
    fn rejects_model_absent_from_requested_runtime() {
        let err = validate(&allow_list(), "gemma2:9b", "vllm").unwrap_err();
        assert!(matches!(err, Error::UnsupportedModel(_)));
    }

    #[test]
    fn rejects_unsupported_runtime_before_checking_allow_list() {
        let err = validate(&allow_list(), "gemma2:9b", "bogus").unwrap_err();
        assert!(matches!(err, Error::UnsupportedRuntime(r) if r == "bogus"));
    }
}
