cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        compile_error!("netsync requires native threads for its background dispatcher; wasm32 is not supported");
    } else {
        mod native;
        pub use native::*;
    }
}

mod timer;
pub use timer::Timer;
