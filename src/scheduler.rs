//! Refresh scheduler: snapshot, encode, and paced group transmission.
//!
//! The scheduler owns the bus, the chip-select line, the hold-window delay,
//! the snapshot and the hardware frame. It is a single sequential task, so
//! two refresh cycles for one display can never overlap and no lock guards
//! the frame. The only state shared with the application is the
//! [`SharedSurface`] it borrows.
//!
//! Every group is sent as:
//!
//! 1. assert chip-select
//! 2. one blocking [`SpiBus::write`] of the group bytes
//! 3. release chip-select, which makes the panels display the group
//! 4. wait for the hold window ([`Config::hold`]), the brightness control
//! 5. assert chip-select again
//!
//! # Shutting down
//! [`RefreshScheduler::run`] returns once `stop` is signalled and the cycle in
//! flight has finished, including its last hold. The bus, pin and delay can
//! then be taken back with [`RefreshScheduler::release`]. Because the
//! scheduler borrows the surface and owns every other buffer, nothing can
//! touch them after it is gone. Dropping the `run` future instead cancels the
//! pending hold on the spot.
//!
//! # Example
//! ```rust,ignore
//! use buse_framebuffer::{buse128x19, RefreshScheduler};
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! use embassy_sync::signal::Signal;
//! use embassy_time::Delay;
//!
//! static SURFACE: buse128x19::Shared<CriticalSectionRawMutex> = buse128x19::Shared::new();
//! static STOP: Signal<CriticalSectionRawMutex, ()> = Signal::new();
//!
//! #[embassy_executor::task]
//! async fn display_task(spi: Spi, cs: Output<'static>) {
//!     let mut scheduler =
//!         buse128x19::Scheduler::new(&SURFACE, spi, cs, Delay, buse128x19::config()).unwrap();
//!     scheduler.run(&STOP).await;
//!     let (_spi, _cs, _delay) = scheduler.release();
//! }
//! ```

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Error as _, SpiBus};
use embedded_hal_async::delay::DelayNs;

use crate::chip_select::ChipSelect;
use crate::config::Config;
use crate::double_buffer::{DoubleBuffer, SharedSurface};
use crate::encoder::{encode, HardwareFrame};
use crate::error::{ConfigError, Error, Result};
use crate::geometry::{Geometry, GROUPS};
use crate::state::{RefreshPolicy, RefreshState, TickOutcome};

/// Counters kept by the scheduler.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RefreshStats {
    /// Cycles that sent all groups.
    pub cycles: u32,
    /// Cycles abandoned after a bus or chip-select failure.
    pub abandoned: u32,
    /// Periodic ticks folded into a later cycle because one was running.
    pub coalesced_ticks: u32,
}

/// Drives one display.
///
/// # Type Parameters
/// - `M`: Raw mutex guarding the shared surface
/// - `SPI`: Bus the panels hang off
/// - `CS`: Chip-select pin
/// - `D`: Delay used for the hold window
/// - `WIDTH`, `HEIGHT`, `SURFACE_BYTES`: Surface dimensions
/// - `FRAME_BYTES`: Frame size, use [`compute_frame_bytes`](crate::compute_frame_bytes)
pub struct RefreshScheduler<
    'a,
    M: RawMutex,
    SPI,
    CS,
    D,
    const WIDTH: usize,
    const HEIGHT: usize,
    const SURFACE_BYTES: usize,
    const FRAME_BYTES: usize,
> {
    bus: SPI,
    cs: ChipSelect<CS>,
    delay: D,
    config: Config,
    geometry: Geometry,
    buffer: DoubleBuffer<'a, M, WIDTH, HEIGHT, SURFACE_BYTES>,
    frame: HardwareFrame<FRAME_BYTES>,
    state: RefreshState,
    stats: RefreshStats,
}

impl<
        'a,
        M: RawMutex,
        SPI: SpiBus,
        CS: OutputPin,
        D: DelayNs,
        const WIDTH: usize,
        const HEIGHT: usize,
        const SURFACE_BYTES: usize,
        const FRAME_BYTES: usize,
    > RefreshScheduler<'a, M, SPI, CS, D, WIDTH, HEIGHT, SURFACE_BYTES, FRAME_BYTES>
{
    /// Validate `config` against the buffer sizes and take over the hardware.
    ///
    /// Chip-select is driven to its asserted resting level. Nothing is sent
    /// until the first cycle runs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the geometry is invalid or does not match
    /// the surface and frame types, or [`Error::ChipSelect`] if the pin cannot
    /// be driven.
    pub fn new(
        surface: &'a SharedSurface<M, WIDTH, HEIGHT, SURFACE_BYTES>,
        bus: SPI,
        cs: CS,
        delay: D,
        config: Config,
    ) -> Result<Self> {
        let geometry = config.geometry()?;
        if geometry.width() != WIDTH || geometry.height() != HEIGHT {
            return Err(ConfigError::SurfaceMismatch {
                surface_width: WIDTH,
                surface_height: HEIGHT,
                width: geometry.width(),
                height: geometry.height(),
            }
            .into());
        }
        geometry.check_buffers(SURFACE_BYTES, FRAME_BYTES)?;
        let cs = ChipSelect::new(cs, config.cs_polarity)?;

        Ok(Self {
            bus,
            cs,
            delay,
            config,
            geometry,
            buffer: DoubleBuffer::new(surface),
            frame: HardwareFrame::new(),
            state: RefreshState::Idle,
            stats: RefreshStats::default(),
        })
    }

    /// Current position in the refresh cycle.
    #[must_use]
    pub fn state(&self) -> RefreshState {
        self.state
    }

    /// Counters since construction.
    #[must_use]
    pub fn stats(&self) -> RefreshStats {
        self.stats
    }

    /// Resolved frame layout.
    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Frame built by the most recent encode.
    #[must_use]
    pub fn frame(&self) -> &HardwareFrame<FRAME_BYTES> {
        &self.frame
    }

    /// Perform the work of the current state and move to the next one.
    ///
    /// `Idle` moves to `Encoding` without doing anything; waiting for a
    /// trigger is the caller's business.
    ///
    /// # Errors
    ///
    /// On a bus or chip-select failure the cycle is abandoned: the state
    /// returns to `Idle` (periodic) or `Encoding` (chained), chip-select is
    /// put back to its resting level if possible, and the error is returned.
    pub async fn step(&mut self) -> Result<RefreshState> {
        let policy = self.config.policy;
        let result = match self.state {
            RefreshState::Idle => Ok(()),
            RefreshState::Encoding => {
                encode(self.buffer.snapshot(), &self.geometry, &mut self.frame);
                Ok(())
            }
            RefreshState::TransmittingGroup(group) => self.transmit(group),
            RefreshState::Holding(_) => {
                self.delay.delay_ns(self.config.hold_ns()).await;
                self.cs.assert()
            }
        };

        match result {
            Ok(()) => {
                self.state = self.state.advance(policy);
                Ok(self.state)
            }
            Err(err) => {
                // back to the resting level; a failure here surfaces next cycle
                let _ = self.cs.assert();
                self.state = self.state.abandon(policy);
                self.stats.abandoned = self.stats.abandoned.wrapping_add(1);
                Err(err)
            }
        }
    }

    /// Run until the current cycle completes, starting one if idle.
    ///
    /// # Errors
    ///
    /// Returns the error that abandoned the cycle, see [`step`](Self::step).
    pub async fn run_cycle(&mut self) -> Result<()> {
        loop {
            let from = self.state;
            self.step().await?;
            if from == RefreshState::Holding((GROUPS - 1) as u8) {
                self.stats.cycles = self.stats.cycles.wrapping_add(1);
                return Ok(());
            }
        }
    }

    /// Refresh the display until `stop` is signalled.
    ///
    /// A cycle left unfinished by earlier [`step`](Self::step) calls is
    /// completed first. Failed cycles are logged and skipped. On return no
    /// hold window is pending and the state is at a cycle boundary.
    pub async fn run<S: RawMutex>(&mut self, stop: &Signal<S, ()>) {
        info!(
            "refresh started: {}x{} on {} panels, {} bytes per group, {} Hz bus, policy {:?}",
            self.geometry.width(),
            self.geometry.height(),
            self.geometry.panels(),
            self.geometry.group_bytes(),
            self.config.bus_hz,
            self.config.policy
        );

        match self.config.policy {
            RefreshPolicy::Periodic { interval } => {
                if self.state.is_busy() {
                    debug!("finishing cycle left at {:?}", self.state);
                    self.refresh().await;
                }
                let mut ticker = Ticker::new(interval);
                while !stop.signaled() {
                    match select(ticker.next(), stop.wait()).await {
                        Either::First(missed) => self.tick(missed).await,
                        Either::Second(()) => break,
                    }
                }
            }
            RefreshPolicy::Chained => {
                while !stop.signaled() {
                    if !self.refresh().await {
                        // let the stop signal and other tasks through
                        embassy_futures::yield_now().await;
                    }
                }
            }
        }

        info!(
            "refresh stopped after {} cycles ({} abandoned)",
            self.stats.cycles,
            self.stats.abandoned
        );
    }

    /// Hand back the bus, chip-select pin and delay.
    pub fn release(self) -> (SPI, CS, D) {
        (self.bus, self.cs.release(), self.delay)
    }

    async fn tick(&mut self, missed: u32) {
        if missed > 0 {
            debug!("{} refresh ticks coalesced", missed);
            self.stats.coalesced_ticks = self.stats.coalesced_ticks.saturating_add(missed);
        }
        match self.state.on_tick() {
            TickOutcome::Start(_) => {
                self.refresh().await;
            }
            TickOutcome::Coalesced => {
                self.stats.coalesced_ticks = self.stats.coalesced_ticks.saturating_add(1);
            }
        }
    }

    async fn refresh(&mut self) -> bool {
        match self.run_cycle().await {
            Ok(()) => true,
            Err(err) => {
                warn!("refresh cycle abandoned: {:?}", err);
                false
            }
        }
    }

    fn transmit(&mut self, group: u8) -> Result<()> {
        let bytes = self.frame.group(usize::from(group));
        self.cs.assert()?;
        self.bus
            .write(bytes)
            .and_then(|()| self.bus.flush())
            .map_err(|e| Error::Bus(e.kind()))?;
        self.cs.deassert()?;
        trace!("group {} sent ({} bytes)", group, bytes.len());
        Ok(())
    }
}

/// Fixed-rate trigger on an absolute time grid.
struct Ticker {
    interval: Duration,
    next: Instant,
}

impl Ticker {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now() + interval,
        }
    }

    /// Wait for the next tick, returning how many extra ticks were missed.
    async fn next(&mut self) -> u32 {
        let (deadline, following, missed) = catch_up(self.next, Instant::now(), self.interval);
        Timer::at(deadline).await;
        self.next = following;
        missed
    }
}

/// Given the pending `deadline` and the current time, return the deadline to
/// wait for, the one after it, and how many grid points were skipped.
///
/// Deadlines that already passed collapse into a single immediate tick and the
/// grid advances past `now`.
fn catch_up(deadline: Instant, now: Instant, interval: Duration) -> (Instant, Instant, u32) {
    if now < deadline {
        return (deadline, deadline + interval, 0);
    }
    let step = interval.as_ticks().max(1);
    let behind = (now - deadline).as_ticks() / step;
    let following = deadline + Duration::from_ticks(step * (behind + 1));
    (deadline, following, u32::try_from(behind).unwrap_or(u32::MAX))
}
