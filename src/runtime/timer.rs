//! Evaluation timing
//!
//! `std::time::Instant` panics on `wasm32-unknown-unknown`, so the browser
//! build reads wall-clock time from `js_sys::Date` instead.

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use std::time::Instant;

    #[derive(Debug, Clone, Copy)]
    pub struct Timer(Instant);

    impl Timer {
        pub fn now() -> Self {
            Self(Instant::now())
        }

        pub fn elapsed_ms(&self) -> f64 {
            self.0.elapsed().as_secs_f64() * 1000.0
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod imp {
    #[derive(Debug, Clone, Copy)]
    pub struct Timer(f64);

    impl Timer {
        pub fn now() -> Self {
            Self(js_sys::Date::now())
        }

        pub fn elapsed_ms(&self) -> f64 {
            (js_sys::Date::now() - self.0).max(0.0)
        }
    }
}

pub use imp::Timer;
