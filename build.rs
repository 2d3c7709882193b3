//! Emits build/commit metadata consumed by `crate::VERSION` at runtime.

fn main() -> shadow_rs::SdResult<()> {
    shadow_rs::new()
}
