use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cancels every pager holding one of its signals.
///
/// The pager checks the signal before each page fetch, an in-flight fetch
/// is allowed to finish.
#[derive(Clone, Debug, Default)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            flag: self.flag.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AbortSignal {
    flag: Arc<AtomicBool>,
}

impl AbortSignal {
    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod test {
    use super::AbortHandle;

    #[test]
    fn signals_share_the_handle() {
        let handle = AbortHandle::new();
        let first = handle.signal();
        let second = handle.clone().signal();

        assert!(!first.is_aborted());
        handle.abort();
        assert!(first.is_aborted());
        assert!(second.is_aborted());
    }
}
