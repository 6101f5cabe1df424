use antr_core::{CapabilityError, InputChannel, KeyId, ResponseOutcome};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};
use tracing::trace;

/// Keyboard events forwarded from the window thread, stamped on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Pressed(KeyId, Instant),
    Escape,
}

/// Reads presses the event loop forwards over a channel.
///
/// Presses queued before a wait opens are dropped, keys outside the
/// recognized set are ignored, and Escape aborts the session.
pub struct ChannelInput {
    keys: Receiver<KeyEvent>,
    interrupted: Arc<AtomicBool>,
}

impl ChannelInput {
    pub fn new(keys: Receiver<KeyEvent>, interrupted: Arc<AtomicBool>) -> Self {
        Self { keys, interrupted }
    }

    fn interrupt(&self) -> CapabilityError {
        self.interrupted.store(true, Ordering::SeqCst);
        CapabilityError::Interrupted
    }

    fn next_event(&self, deadline: Option<Instant>) -> Result<Option<KeyEvent>, CapabilityError> {
        match deadline {
            None => self
                .keys
                .recv()
                .map(Some)
                .map_err(|_| CapabilityError::Disconnected("keyboard")),
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match self.keys.recv_timeout(remaining) {
                    Ok(event) => Ok(Some(event)),
                    Err(RecvTimeoutError::Timeout) => Ok(None),
                    Err(RecvTimeoutError::Disconnected) => {
                        Err(CapabilityError::Disconnected("keyboard"))
                    }
                }
            }
        }
    }
}

impl InputChannel for ChannelInput {
    fn wait_for_key(
        &mut self,
        timeout: Option<Duration>,
        recognized: &[KeyId],
    ) -> Result<ResponseOutcome, CapabilityError> {
        let opened = Instant::now();
        loop {
            match self.keys.try_recv() {
                Ok(KeyEvent::Escape) => return Err(self.interrupt()),
                Ok(KeyEvent::Pressed(key, _)) => trace!(%key, "dropping press from before the wait"),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    return Err(CapabilityError::Disconnected("keyboard"));
                }
            }
        }

        let deadline = timeout.map(|t| opened + t);
        while let Some(event) = self.next_event(deadline)? {
            match event {
                KeyEvent::Escape => return Err(self.interrupt()),
                KeyEvent::Pressed(key, at) if at >= opened && recognized.contains(&key) => {
                    return Ok(ResponseOutcome::pressed(key, at.duration_since(opened)));
                }
                KeyEvent::Pressed(key, _) => trace!(%key, "ignoring key outside the response set"),
            }
        }
        Ok(ResponseOutcome::timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    fn channel() -> (mpsc::Sender<KeyEvent>, ChannelInput, Arc<AtomicBool>) {
        let (tx, rx) = mpsc::channel();
        let flag = Arc::new(AtomicBool::new(false));
        (tx, ChannelInput::new(rx, flag.clone()), flag)
    }

    const KEY: KeyId = KeyId::SPACE;

    #[test]
    fn stale_presses_are_discarded() {
        let (tx, mut input, _) = channel();
        tx.send(KeyEvent::Pressed(KEY, Instant::now())).unwrap();
        let out = input
            .wait_for_key(Some(Duration::from_millis(20)), &[KEY])
            .unwrap();
        assert!(out.is_timeout());
    }

    #[test]
    fn press_during_the_wait_is_timed_from_its_opening() {
        let (tx, mut input, _) = channel();
        let sender = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            tx.send(KeyEvent::Pressed(KeyId::new('x'), Instant::now())).unwrap();
            tx.send(KeyEvent::Pressed(KEY, Instant::now())).unwrap();
        });
        let out = input
            .wait_for_key(Some(Duration::from_secs(2)), &[KEY])
            .unwrap();
        sender.join().unwrap();
        assert_eq!(out.key, Some(KEY));
        let rt = out.reaction_time.unwrap();
        assert!(rt >= Duration::from_millis(30) && rt < Duration::from_secs(2));
    }

    #[test]
    fn escape_interrupts_and_raises_the_flag() {
        let (tx, mut input, flag) = channel();
        tx.send(KeyEvent::Escape).unwrap();
        assert_eq!(
            input.wait_for_key(None, &[KEY]),
            Err(CapabilityError::Interrupted)
        );
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn closed_window_disconnects() {
        let (tx, mut input, _) = channel();
        drop(tx);
        assert_eq!(
            input.wait_for_key(Some(Duration::from_millis(5)), &[KEY]),
            Err(CapabilityError::Disconnected("keyboard"))
        );
    }
}
