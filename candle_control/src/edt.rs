use heapless::Vec;

use no_std_compat::cell::{Cell, RefCell};

/// Upper bound of simultaneously scheduled messages. The control loop keeps at most one.
pub const QUEUE_CAPACITY: usize = 8;

#[derive(Clone, Debug, Eq, PartialEq, Copy)]
pub struct Msg<T: Sized> {
    pub when: u32,
    pub order: u32,
    pub payload: T,
}

/// Event dispatch thread: a queue of delayed messages with a virtual millisecond clock.
///
/// Time only moves when [EDT::poll] reports a wait (the board then blocks on a timer) or when
/// the core wakes up from sleep ([EDT::sleep_until]). The clock wraps around after ~49 days,
/// due times are therefore always compared relative to [EDT::now].
pub struct EDT<T> {
    now: Cell<u32>,
    next_order: Cell<u32>,
    pub(crate) queue: RefCell<Vec<Msg<T>, QUEUE_CAPACITY>>,
}

impl<T: Copy> EDT<T> {
    pub fn create() -> EDT<T> {
        EDT {
            now: Cell::new(0),
            next_order: Cell::new(0),
            queue: RefCell::new(Vec::new()),
        }
    }
}

pub enum Event<T> {
    Execute { msg: T },
    Wait { ms: u32 },
    /// Nothing is scheduled, the core may sleep until the next interrupt
    Idle,
}

impl<T: Copy> EDT<T> {
    pub fn now(&self) -> u32 {
        self.now.get()
    }

    pub fn poll(&self) -> Event<T> {
        match self.peek_head() {
            Some(head) => {
                let to_wait = head.when.wrapping_sub(self.now.get());
                self.now.set(head.when);
                if to_wait > 0 {
                    Event::Wait { ms: to_wait }
                } else {
                    self.take(&head);
                    Event::Execute { msg: head.payload }
                }
            }
            None => Event::Idle,
        }
    }

    /// Moves the clock forward while the core sleeps. Only valid when nothing is scheduled.
    pub fn sleep_until(&self, when: u32) {
        debug_assert!(self.queue.borrow().is_empty());
        self.now.set(when);
    }

    /// Advances the time by the given value and feeds messages to the handler
    #[cfg(not(target_os = "none"))]
    pub fn advance_time_by(&self, time: u32, handler: &dyn Fn(T)) {
        let target = self.now.get().wrapping_add(time);
        loop {
            let remaining = target.wrapping_sub(self.now.get());
            match self.peek_head() {
                Some(head) if self.due_in(&head) <= remaining => {
                    self.now.set(head.when);
                    self.take(&head);
                    handler(head.payload);
                }
                _ => {
                    self.now.set(target);
                    break;
                }
            }
        }
    }

    pub fn schedule(&self, delay: u32, payload: T) {
        let order = self.next_order.get();
        self.next_order.set(order.wrapping_add(1));

        let pushed = self.queue.borrow_mut().push(Msg {
            when: self.now.get().wrapping_add(delay),
            order,
            payload,
        });

        debug_assert!(pushed.is_ok(), "EDT queue overflow");
    }

    #[cfg(not(target_os = "none"))]
    pub fn queue_len(&self) -> usize {
        self.queue.borrow().len()
    }

    fn due_in(&self, msg: &Msg<T>) -> u32 {
        msg.when.wrapping_sub(self.now.get())
    }

    fn peek_head(&self) -> Option<Msg<T>> {
        self.queue
            .borrow()
            .iter()
            .min_by_key(|it| (self.due_in(it), it.order.wrapping_sub(self.next_order.get())))
            .cloned()
    }

    fn take(&self, head: &Msg<T>) {
        let mut queue = self.queue.borrow_mut();
        let position = queue
            .iter()
            .position(|it| it.when == head.when && it.order == head.order);
        debug_assert!(position.is_some());
        if let Some(position) = position {
            // storage order is irrelevant, the head is looked up by (when, order)
            queue.swap_remove(position);
        }
    }
}
