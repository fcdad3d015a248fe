use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc, Arc,
};

use crate::error::SplashError;

/// A one-shot background load that can be cancelled.
///
/// The job runs on its own named thread and reports through a channel the
/// owner polls once per frame. Cancelling cannot interrupt the job itself,
/// but guarantees its result is never delivered: the thread checks the flag
/// before sending, and the owner drops the receiver.
pub struct PendingLoad<T> {
    receiver: Option<mpsc::Receiver<Result<T, SplashError>>>,
    cancelled: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl<T: Send + 'static> PendingLoad<T> {
    /// Start `job` on a background thread called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SplashError::ThreadSpawn`] if the thread cannot be started.
    pub fn spawn<F>(name: &str, job: F) -> Result<Self, SplashError>
    where
        F: FnOnce() -> Result<T, SplashError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let thread = std::thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || {
                let result = job();
                if !flag.load(Ordering::Acquire) {
                    let _ = tx.send(result);
                }
            })
            .map_err(|e| SplashError::ThreadSpawn(Arc::new(e)))?;

        Ok(Self {
            receiver: Some(rx),
            cancelled,
            thread: Some(thread),
        })
    }

    /// Non-blocking check for the result.
    ///
    /// Returns `None` while the job is running or after cancellation.
    pub fn poll(&mut self) -> Option<Result<T, SplashError>> {
        let receiver = self.receiver.as_ref()?;
        match receiver.try_recv() {
            Ok(result) => {
                self.finish();
                Some(result)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.finish();
                Some(Err(SplashError::AssetLoad(
                    "load thread exited without a result".to_owned(),
                )))
            }
        }
    }

    /// Block until the job finishes.
    ///
    /// # Errors
    ///
    /// Returns the job's own error, or [`SplashError::AssetLoad`] if the
    /// load was cancelled or its thread died.
    pub fn wait(&mut self) -> Result<T, SplashError> {
        let Some(receiver) = self.receiver.as_ref() else {
            return Err(SplashError::AssetLoad("load was cancelled".to_owned()));
        };
        let result = receiver.recv().map_err(|_| {
            SplashError::AssetLoad("load thread exited without a result".to_owned())
        });
        self.finish();
        result?
    }

    /// Drop the result of the job, whenever it arrives.
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        self.receiver = None;
        // The job cannot be interrupted; let the thread run out detached.
        drop(self.thread.take());
    }

    fn finish(&mut self) {
        self.receiver = None;
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl<T> Drop for PendingLoad<T> {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Barrier, time::Duration};

    use super::*;

    #[test]
    fn wait_returns_job_result() {
        let mut load = PendingLoad::spawn("test-load", || Ok(41 + 1)).unwrap();
        assert_eq!(load.wait().unwrap(), 42);
        // Delivered once only.
        assert!(load.poll().is_none());
    }

    #[test]
    fn job_error_propagates() {
        let mut load: PendingLoad<u32> = PendingLoad::spawn("test-load", || {
            Err(SplashError::AssetLoad("404".to_owned()))
        })
        .unwrap();
        let err = load.wait().unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn poll_is_empty_until_job_finishes() {
        let gate = Arc::new(Barrier::new(2));
        let job_gate = Arc::clone(&gate);
        let mut load = PendingLoad::spawn("test-load", move || {
            let _ = job_gate.wait();
            Ok("done")
        })
        .unwrap();

        assert!(load.poll().is_none());
        let _ = gate.wait();

        let mut result = None;
        for _ in 0..500 {
            result = load.poll();
            if result.is_some() {
                break;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        assert_eq!(result.unwrap().unwrap(), "done");
    }

    #[test]
    fn cancelled_load_never_delivers() {
        let gate = Arc::new(Barrier::new(2));
        let job_gate = Arc::clone(&gate);
        let mut load = PendingLoad::spawn("test-load", move || {
            let _ = job_gate.wait();
            Ok(1)
        })
        .unwrap();

        load.cancel();
        let _ = gate.wait();
        std::thread::sleep(Duration::from_millis(10));

        assert!(load.poll().is_none());
        assert!(load.wait().is_err());
    }
}
