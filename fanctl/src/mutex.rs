// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::{cell::Cell, cell::UnsafeCell, mem::MaybeUninit};

pub use critical_section::{CriticalSection, Mutex};

macro_rules! define_context {
    ($name:ident) => {
        pub struct $name<'cs>(CriticalSection<'cs>);

        impl<'cs> $name<'cs> {
            /// Create a new context.
            ///
            /// # SAFETY
            ///
            /// This may only be called from the corresponding context.
            /// `MainCtx` may only be constructed from `main()`
            /// and `IrqCtx` may only be constructed from ISRs.
            #[inline(always)]
            pub unsafe fn new() -> Self {
                // SAFETY: This cs is not used to mask interrupts.
                //         If a function takes a `MainCtx` argument, it can only be
                //         called from `main()` context. Correspondingly for `IrqCtx`.
                //
                //         `MainCtxCell` can only be used from the main context.
                //         State shared with interrupts is accessed through
                //         `critical_section::with` from main context
                //         and through the ISR's own masked state from `IrqCtx`.
                let cs = unsafe { CriticalSection::new() };
                fence();
                Self(cs)
            }

            /// Get the `CriticalSection` that belongs to this context.
            #[inline(always)]
            pub fn cs(&self) -> CriticalSection<'cs> {
                self.0
            }
        }

        impl<'cs> Drop for $name<'cs> {
            #[inline(always)]
            fn drop(&mut self) {
                fence();
            }
        }
    };
}

define_context!(MainCtx);
define_context!(IrqCtx);

/// Main context initialization marker.
///
/// This marker does not have a pub constructor.
/// It is only created by [MainCtx::new_with_init].
pub struct MainInitCtx(());

impl<'cs> MainCtx<'cs> {
    /// # SAFETY
    ///
    /// The safety contract of [MainCtx::new] must be upheld.
    /// Interrupts must still be disabled.
    #[inline(always)]
    pub unsafe fn new_with_init<F: FnOnce(&MainInitCtx)>(f: F) -> Self {
        f(&MainInitCtx(()));
        // SAFETY: Safety contract of MainCtx::new is upheld by the caller.
        unsafe { Self::new() }
    }
}

/// Lazy initialization of static variables.
///
/// The value is written once during construction of the [MainCtx],
/// before interrupts are enabled.
pub struct LazyInit<T>(UnsafeCell<MaybeUninit<T>>);

impl<T> LazyInit<T> {
    /// # SAFETY
    ///
    /// It must be ensured that the returned instance is initialized
    /// with a call to [Self::init] during construction of the [MainCtx].
    /// See [MainCtx::new_with_init].
    ///
    /// Using this object in any way before initializing it will
    /// result in Undefined Behavior.
    #[inline(always)]
    pub const unsafe fn uninit() -> Self {
        Self(UnsafeCell::new(MaybeUninit::uninit()))
    }

    #[inline(always)]
    pub fn init(&self, _i: &MainInitCtx, inner: T) {
        // SAFETY: Interrupts are disabled and no MainCtx exists yet.
        //         Nobody else can observe the write.
        unsafe { *self.0.get() = MaybeUninit::new(inner) };
    }

    #[inline(always)]
    pub fn main(&self, _m: &MainCtx<'_>) -> &T {
        // SAFETY: the `Self::uninit` safety contract ensures that `Self::init` is called before us.
        unsafe { (*self.0.get()).assume_init_ref() }
    }

    #[inline(always)]
    pub fn irq(&self, _c: &IrqCtx<'_>) -> &T {
        // SAFETY: the `Self::uninit` safety contract ensures that `Self::init` is called before us.
        //         Interrupts are only enabled after initialization.
        unsafe { (*self.0.get()).assume_init_ref() }
    }
}

// SAFETY: If T is Send, then we can Send the whole object. The object only contains T state.
unsafe impl<T: Send> Send for LazyInit<T> {}

// SAFETY: The value is only written before any context exists.
//         Afterwards it is only handed out as shared reference.
unsafe impl<T> Sync for LazyInit<T> {}

/// Optimization and reordering fence.
#[inline(always)]
pub fn fence() {
    core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
}

/// A cell that can only be accessed from the main context.
///
/// Interrupt handlers never see this state.
/// Therefore, no interrupt masking is needed.
pub struct MainCtxCell<T> {
    inner: Mutex<Cell<T>>,
}

impl<T> MainCtxCell<T> {
    #[inline]
    pub const fn new(inner: T) -> Self {
        Self {
            inner: Mutex::new(Cell::new(inner)),
        }
    }

    #[inline]
    pub fn replace(&self, m: &MainCtx<'_>, inner: T) -> T {
        self.inner.borrow(m.cs()).replace(inner)
    }
}

impl<T: Copy> MainCtxCell<T> {
    #[inline]
    pub fn get(&self, m: &MainCtx<'_>) -> T {
        self.inner.borrow(m.cs()).get()
    }

    #[inline]
    pub fn set(&self, m: &MainCtx<'_>, inner: T) {
        self.inner.borrow(m.cs()).set(inner);
    }
}


// vim: ts=4 sw=4 expandtab
