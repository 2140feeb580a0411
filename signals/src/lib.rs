/*!
Typed, synchronous signal/slot dispatch for a single thread

# Design requirements:
- A signal is typed by the tuple of arguments it emits; slots of any arity from zero to four
  connect with plain closures
- Emission is synchronous and in connection order, on the emitter's stack
- A slot may disconnect itself or any other slot, clear the signal, or re-emit it while it runs
- A tracker severs every connection it made when it is dropped, and a signal tells its trackers
  when it is dropped first. Neither owns the other.

# Nomenclature:
- slot - a connected callback. See [`Slot`]
- tombstone - a slot entry disconnected during an emission. It keeps its place in the list until
  the outermost emission finishes, then it is compacted away
- emission depth - how many emissions of one signal are currently on the stack

# Basic usage

```rust
use slotwire_signals::*;
use std::{cell::RefCell, rc::Rc};

let clicked: Signal<(i32, i32)> = Signal::new();
let log = Rc::new(RefCell::new(Vec::new()));

let first = {
    let log = log.clone();
    clicked.connect(move |x: i32, y: i32| log.borrow_mut().push(format!("first {x},{y}")))
};
{
    let log = log.clone();
    clicked.connect(move |x: i32, _y: i32| log.borrow_mut().push(format!("second {x}")));
}

clicked.emit(1, 2);
assert_eq!(*log.borrow(), ["first 1,2", "second 1"]);

clicked.disconnect(first).unwrap();
clicked.emit(3, 4);
assert_eq!(log.borrow().last().unwrap(), "second 3");
```

# Tracker usage

```rust
use slotwire_signals::*;

let focus: Signal<(bool,)> = Signal::new();
{
    let tracker = Tracker::new();
    tracker.join(&focus, |_focused: bool| {});
    assert_eq!(focus.connection_count(), 1);
    // the tracker goes out of scope here and takes its connection with it
}
assert_eq!(focus.connection_count(), 0);
```

Everything here is built on `Rc` and `RefCell`; signals and trackers are neither `Send` nor `Sync`.
*/

mod connection_list;
mod error;
mod holder;
mod id;
mod signal;
mod slot;
mod tracker;

pub use error::*;
pub use id::*;
pub use signal::*;
pub use slot::*;
pub use tracker::*;
