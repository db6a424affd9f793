#[cfg(all(feature = "sync", feature = "std"))]
pub use std::sync::Mutex;
#[cfg(all(feature = "sync", not(feature = "std")))]
pub use spin::Mutex;

/// Handle to a backend held by the drive table, also kept by the integrator
#[cfg(feature = "sync")]
pub type Shared<T> = alloc::sync::Arc<Mutex<T>>;
#[cfg(not(feature = "sync"))]
pub type Shared<T> = alloc::rc::Rc<core::cell::RefCell<T>>;

pub fn shared<T>(t: T) -> Shared<T> {
    match () {
        #[cfg(feature = "sync")]
        () => alloc::sync::Arc::new(Mutex::new(t)),
        #[cfg(not(feature = "sync"))]
        () => alloc::rc::Rc::new(core::cell::RefCell::new(t)),
    }
}

macro_rules! acquire {
    ($shared: expr) => {
        match () {
            #[cfg(all(feature = "sync", feature = "std"))]
            () => $shared.lock().unwrap_or_else(std::sync::PoisonError::into_inner),
            #[cfg(all(feature = "sync", not(feature = "std")))]
            () => $shared.lock(),
            #[cfg(not(feature = "sync"))]
            () => $shared.borrow_mut(),
        }
    };
}

pub(crate) use acquire;
