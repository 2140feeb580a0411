use std::rc::Rc;

/// A shared handle to a type-erased callback taking the argument tuple `A`.
///
/// Cloning a slot shares the callback. A signal keeps its own clone for as long as the
/// connection lives, so a slot handed to several signals (or kept around by the caller)
/// outlives any single disconnect.
pub struct Slot<A>(Rc<dyn Fn(A)>);

/// Trait for types that can be converted into a [`Slot`] for a signal with arguments `A`.
///
/// Implemented for closures taking zero to four arguments, matching `()`, `(A1,)`,
/// `(A1, A2)` and so on, and for [`Slot`] itself.
pub trait IntoSlot<A> {
    fn into_slot(self) -> Slot<A>;
}

impl<A> Slot<A> {
    pub fn new<F>(callback: F) -> Self
    where F: IntoSlot<A> {
        callback.into_slot()
    }

    /// Invokes the callback
    pub fn call(&self, args: A) { (self.0)(args) }

    /// Returns true if both handles share the same callback
    pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }
}

impl<A> Clone for Slot<A> {
    fn clone(&self) -> Self { Self(Rc::clone(&self.0)) }
}

impl<A> std::fmt::Debug for Slot<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot").field("handles", &Rc::strong_count(&self.0)).finish()
    }
}

impl<A> IntoSlot<A> for Slot<A> {
    fn into_slot(self) -> Slot<A> { self }
}

macro_rules! impl_into_slot {
    ($($arg:ident: $ty:ident),*) => {
        impl<Func, $($ty),*> IntoSlot<($($ty,)*)> for Func
        where Func: Fn($($ty),*) + 'static
        {
            fn into_slot(self) -> Slot<($($ty,)*)> {
                let callback = self;
                Slot(Rc::new(move |($($arg,)*): ($($ty,)*)| callback($($arg),*)))
            }
        }
    };
}

impl_into_slot!();
impl_into_slot!(a1: A1);
impl_into_slot!(a1: A1, a2: A2);
impl_into_slot!(a1: A1, a2: A2, a3: A3);
impl_into_slot!(a1: A1, a2: A2, a3: A3, a4: A4);
