use std::io;
use std::time::{Duration, Instant};

use crossterm::event::Event;

use crate::drivers::InputDriver;

pub enum ControlFlow {
    /// Poll again after the regular interval.
    Continue,
    /// Wake no later than this instant, e.g. for a transition phase.
    WakeAt(Instant),
    Quit,
}

/// Single-threaded pump: polls the input driver and hands events to a
/// handler.
///
/// The handler is called with `None` once per iteration before input is
/// polled, which is where hosts advance window transitions and draw. Input
/// bursts are drained in one go so a fast drag does not fall behind.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    fn timeout(&self, flow: &ControlFlow, now: Instant) -> Duration {
        match flow {
            ControlFlow::WakeAt(at) => at.saturating_duration_since(now).min(self.poll_interval),
            _ => self.poll_interval,
        }
    }

    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            let flow = handler(&mut self.driver, None)?;
            if let ControlFlow::Quit = flow {
                return Ok(());
            }
            let timeout = self.timeout(&flow, Instant::now());
            if !self.driver.poll(timeout)? {
                continue;
            }
            loop {
                let event = self.driver.read()?;
                if let ControlFlow::Quit = handler(&mut self.driver, Some(event))? {
                    return Ok(());
                }
                if !self.driver.poll(Duration::ZERO)? {
                    break;
                }
            }
        }
    }
}
