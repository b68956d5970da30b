//! Real-time playback of a [`Sequence`] against a MIDI output.
//!
//! A player owns one [`MidiEngine`] and runs at most one background dispatch
//! thread. The thread polls a virtual clock in short sleep slices and sends
//! each event once the clock reaches its timestamp. Pause, resume and stop
//! are picked up on the next slice.

use crate::config::DEFAULT_CHANNEL;
use crate::midi::{MidiEngine, MidiError, MidiMessage, Result};
use crate::sequence::{EventKind, ScheduledEvent, Sequence, DEFAULT_VELOCITY};
use crate::state::{PlaybackState, Transport};
use crate::timing::PRESS_DURATION;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const DISPATCH_SLICE: Duration = Duration::from_millis(1);
const PAUSE_SLICE: Duration = Duration::from_millis(10);
const STOP_TIMEOUT: Duration = Duration::from_secs(1);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Output<E> {
    engine: E,
    port_name: Option<String>,
    channel: u8,
}

impl<E: MidiEngine> Output<E> {
    fn write(&mut self, message: MidiMessage) -> Result<()> {
        if !self.engine.is_open() {
            return Err(MidiError::NotConnected);
        }
        debug!("Sending {:?}", message);
        self.engine.send(&message.to_bytes())
    }

    fn note_on(&mut self, note: u8, velocity: u8) -> Result<()> {
        let channel = self.channel;
        self.write(MidiMessage::NoteOn {
            channel,
            note,
            velocity,
        })
    }

    fn note_off(&mut self, note: u8) -> Result<()> {
        let channel = self.channel;
        self.write(MidiMessage::NoteOff {
            channel,
            note,
            velocity: 0,
        })
    }
}

/// State reachable from both the caller and the dispatch thread
struct Shared<E> {
    output: Mutex<Output<E>>,
    transport: Mutex<Transport>,
}

impl<E: MidiEngine> Shared<E> {
    fn press_button(&self, note: u8, duration: Duration) -> Result<()> {
        lock(&self.output).note_on(note, DEFAULT_VELOCITY)?;
        thread::sleep(duration);
        lock(&self.output).note_off(note)
    }

    fn execute(&self, event: &ScheduledEvent) -> Result<()> {
        match event.kind {
            EventKind::NoteOn { note, velocity } => lock(&self.output).note_on(note, velocity),
            EventKind::NoteOff { note } => lock(&self.output).note_off(note),
            EventKind::SlotPress { note, duration } => {
                let duration = Duration::try_from_secs_f64(duration)
                    .unwrap_or_else(|_| Duration::from_secs_f64(PRESS_DURATION));
                self.press_button(note, duration)
            }
        }
    }

    fn clock(&self, run: u64) -> Clock {
        let transport = lock(&self.transport);
        if transport.run() != run {
            return Clock::Ended;
        }
        match transport.state() {
            PlaybackState::Stopped => Clock::Ended,
            PlaybackState::Paused => Clock::Paused,
            PlaybackState::Playing => Clock::Running(transport.current_time(Instant::now())),
        }
    }
}

/// What the dispatch thread sees when it samples the transport
enum Clock {
    Running(f64),
    Paused,
    /// The run was stopped or superseded by a newer one
    Ended,
}

fn dispatch<E: MidiEngine>(
    shared: Arc<Shared<E>>,
    sequence: Arc<Sequence>,
    run: u64,
    cancel: Arc<AtomicBool>,
    _done: Sender<()>,
) {
    info!(
        "Playback thread started: {} events over {:.2}s",
        sequence.len(),
        sequence.total_duration()
    );

    let events = sequence.events();
    let mut cursor = 0;
    while cursor < events.len() && !cancel.load(Ordering::SeqCst) {
        let now = match shared.clock(run) {
            Clock::Running(now) => now,
            Clock::Paused => {
                thread::sleep(PAUSE_SLICE);
                continue;
            }
            Clock::Ended => break,
        };

        let event = &events[cursor];
        if now >= event.timestamp {
            if let Err(e) = shared.execute(event) {
                warn!("Error executing MIDI event '{}': {}", event.label, e);
            }
            cursor += 1;
        } else {
            thread::sleep(DISPATCH_SLICE);
        }
    }

    if lock(&shared.transport).finish(run) {
        info!("Playback finished after {} of {} events", cursor, events.len());
    }
}

struct Worker {
    handle: JoinHandle<()>,
    done: Receiver<()>,
    cancel: Arc<AtomicBool>,
}

impl Worker {
    /// Signals the thread and joins it, giving up after `timeout`
    fn shutdown(self, timeout: Duration) {
        self.cancel.store(true, Ordering::SeqCst);
        match self.done.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if self.handle.join().is_err() {
                    warn!("Playback thread panicked");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!("Playback thread did not exit within {:?}", timeout);
            }
        }
    }
}

/// Plays sequences on a single MIDI output
pub struct MidiPlayer<E: MidiEngine + 'static> {
    shared: Arc<Shared<E>>,
    /// Held across every connect, play, stop and disconnect transition
    worker: Mutex<Option<Worker>>,
}

impl<E: MidiEngine + 'static> MidiPlayer<E> {
    pub fn new(engine: E) -> Self {
        MidiPlayer {
            shared: Arc::new(Shared {
                output: Mutex::new(Output {
                    engine,
                    port_name: None,
                    channel: DEFAULT_CHANNEL,
                }),
                transport: Mutex::new(Transport::new()),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Zero-based MIDI channel used for every message
    pub fn channel(&self) -> u8 {
        lock(&self.shared.output).channel
    }

    pub fn set_channel(&self, channel: u8) {
        lock(&self.shared.output).channel = channel & 0x0F;
    }

    pub fn list_ports(&self) -> Result<Vec<String>> {
        lock(&self.shared.output).engine.list_ports()
    }

    /// Opens `port_name`, or the first available port when `None`.
    /// Returns the name of the opened port.
    pub fn connect(&self, port_name: Option<&str>) -> Result<String> {
        let mut worker = lock(&self.worker);
        self.release(&mut worker);

        let mut output = lock(&self.shared.output);
        let ports = output.engine.list_ports()?;
        info!("Available MIDI output ports: {:?}", ports);
        if ports.is_empty() {
            return Err(MidiError::NoOutputPorts);
        }

        let index = match port_name {
            Some(name) => ports.iter().position(|p| p == name).ok_or_else(|| {
                MidiError::PortNotFound {
                    requested: name.to_string(),
                    available: ports.clone(),
                }
            })?,
            None => 0,
        };

        output.engine.open(index)?;
        let name = ports[index].clone();
        info!("Connected to MIDI output port: {}", name);
        output.port_name = Some(name.clone());
        Ok(name)
    }

    /// Stops any playback, then releases the port
    pub fn disconnect(&self) {
        let mut worker = lock(&self.worker);
        self.release(&mut worker);
    }

    fn release(&self, worker: &mut Option<Worker>) {
        self.halt(worker);
        let mut output = lock(&self.shared.output);
        if output.engine.is_open() {
            output.engine.close();
            info!("Disconnected from MIDI output port: {:?}", output.port_name);
        }
        output.port_name = None;
    }

    pub fn is_connected(&self) -> bool {
        lock(&self.shared.output).engine.is_open()
    }

    pub fn port_name(&self) -> Option<String> {
        lock(&self.shared.output).port_name.clone()
    }

    pub fn send_note_on(&self, note: u8, velocity: u8) -> Result<()> {
        lock(&self.shared.output).note_on(note, velocity)
    }

    pub fn send_note_off(&self, note: u8) -> Result<()> {
        lock(&self.shared.output).note_off(note)
    }

    /// Note-on, hold for `duration`, note-off
    pub fn press_button(&self, note: u8, duration: Duration) -> Result<()> {
        self.shared.press_button(note, duration)
    }

    /// Starts playing `sequence` on a background thread
    pub fn play(&self, sequence: Arc<Sequence>) -> Result<()> {
        let mut worker = lock(&self.worker);
        if !self.is_connected() {
            return Err(MidiError::NotConnected);
        }

        let run = lock(&self.shared.transport)
            .start(Instant::now())
            .ok_or(MidiError::AlreadyPlaying)?;

        // A previous run has already finished; reap its thread.
        if let Some(previous) = worker.take() {
            previous.shutdown(STOP_TIMEOUT);
        }

        let (done_tx, done_rx) = channel::bounded(0);
        let cancel = Arc::new(AtomicBool::new(false));
        let shared = Arc::clone(&self.shared);
        let thread_cancel = Arc::clone(&cancel);
        let handle = thread::spawn(move || {
            dispatch(shared, sequence, run, thread_cancel, done_tx);
        });

        *worker = Some(Worker {
            handle,
            done: done_rx,
            cancel,
        });
        info!("Playback started (run {})", run);
        Ok(())
    }

    pub fn pause(&self) -> bool {
        let now = Instant::now();
        let mut transport = lock(&self.shared.transport);
        let paused = transport.pause(now);
        if paused {
            info!("Playback paused at {:.3}s", transport.current_time(now));
        }
        paused
    }

    pub fn resume(&self) -> bool {
        let now = Instant::now();
        let mut transport = lock(&self.shared.transport);
        let resumed = transport.resume(now);
        if resumed {
            info!("Playback resumed at {:.3}s", transport.current_time(now));
        }
        resumed
    }

    /// Stops playback, waits for the dispatch thread, then silences every note.
    /// `state()` keeps reporting the old state until the thread has exited.
    pub fn stop(&self) {
        let mut worker = lock(&self.worker);
        self.halt(&mut worker);
    }

    fn halt(&self, worker: &mut Option<Worker>) {
        let was_active = lock(&self.shared.transport).state() != PlaybackState::Stopped;

        if let Some(worker) = worker.take() {
            worker.shutdown(STOP_TIMEOUT);
        }
        lock(&self.shared.transport).stop();

        if was_active {
            self.all_notes_off();
            info!("Playback stopped");
        }
    }

    pub fn state(&self) -> PlaybackState {
        lock(&self.shared.transport).state()
    }

    /// Seconds of performance time elapsed, excluding pauses
    pub fn current_time(&self) -> f64 {
        lock(&self.shared.transport).current_time(Instant::now())
    }

    /// Note-off for all 128 notes; individual send failures are ignored
    fn all_notes_off(&self) {
        let mut output = lock(&self.shared.output);
        if !output.engine.is_open() {
            return;
        }
        for note in 0..=127u8 {
            let _ = output.note_off(note);
        }
        debug!("Sent note-off sweep for all notes");
    }
}

impl<E: MidiEngine + 'static> Drop for MidiPlayer<E> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
