// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The annotation loop.
//!
//! Each iteration polls for one input event and applies it to the session,
//! advances the frame source if still playing, then renders the frame with
//! the overlay of the updated session. Input is applied before advancing so
//! a pause freezes the frame the operator was looking at. Polling blocks
//! while paused since there is no frame to advance to.

use crate::config::KeyBindings;
use crate::io::input::{InputEvent, InputSource, Poll};
use crate::io::media::{Frame, FrameSource};
use crate::models::annotation::PolygonCollection;
use crate::models::overlay;
use crate::models::session::{Outcome, Session};
use crate::ui::DisplaySink;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Quit key pressed.
    Quit,
    /// Frame source ran out of frames.
    Exhausted,
    /// Input source closed (window closed, replay script used up).
    InputClosed,
    /// Frame source failed mid-stream.
    SourceFailed,
}

/// Whether to keep iterating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop(StopReason),
}

/// Owns the session and the frame on screen.
pub struct Annotator {
    session: Session,
    keys: KeyBindings,
    /// Replaced on every advance; kept while paused so it can be redrawn.
    frame: Option<Frame>,
}

impl Annotator {
    pub fn new(keys: KeyBindings) -> Self {
        Self {
            session: Session::new(),
            keys,
            frame: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn keys(&self) -> &KeyBindings {
        &self.keys
    }

    /// Run one loop iteration.
    pub fn tick<F, D, I>(&mut self, frames: &mut F, display: &mut D, input: &mut I) -> Flow
    where
        F: FrameSource + ?Sized,
        D: DisplaySink + ?Sized,
        I: InputSource + ?Sized,
    {
        let flow = match input.poll(self.session.is_paused()) {
            Poll::Event(event) => self.handle(event),
            Poll::Idle => Flow::Continue,
            Poll::Closed => {
                log::info!("Input closed");
                Flow::Stop(StopReason::InputClosed)
            }
        };
        if let Flow::Stop(_) = flow {
            return flow;
        }

        // The first frame is loaded even if paused before it arrived, so
        // clicks always land on a frame that has been shown.
        if !self.session.is_paused() || self.frame.is_none() {
            match frames.next_frame() {
                Ok(Some(frame)) => self.frame = Some(frame),
                Ok(None) => {
                    log::info!("End of video reached");
                    return Flow::Stop(StopReason::Exhausted);
                }
                Err(e) => {
                    log::error!("Frame source failed: {:#}", e);
                    return Flow::Stop(StopReason::SourceFailed);
                }
            }
        }

        if let Some(frame) = &self.frame {
            display.render(frame, &overlay::build(&self.session));
        }
        Flow::Continue
    }

    /// Apply one input event to the session.
    pub fn handle(&mut self, event: InputEvent) -> Flow {
        let outcome = match event {
            InputEvent::Click(point) => self.session.click(point),
            InputEvent::Key(key) => match self.keys.action_for(key) {
                Some(action) => self.session.perform(action),
                None => {
                    log::debug!("No action bound to key '{}'", key);
                    Outcome::Ignored
                }
            },
        };

        match outcome {
            Outcome::Quit => {
                log::info!("Exiting");
                Flow::Stop(StopReason::Quit)
            }
            Outcome::Rejected(rejection) => {
                log::warn!("{}", rejection);
                Flow::Continue
            }
            Outcome::Applied | Outcome::Ignored => Flow::Continue,
        }
    }

    /// End the run and hand back the finished zones.
    pub fn finish(self) -> PolygonCollection {
        self.session.into_zones()
    }
}

/// Iterate until the loop stops.
pub fn run<F, D, I>(
    annotator: &mut Annotator,
    frames: &mut F,
    display: &mut D,
    input: &mut I,
) -> StopReason
where
    F: FrameSource + ?Sized,
    D: DisplaySink + ?Sized,
    I: InputSource + ?Sized,
{
    loop {
        if let Flow::Stop(reason) = annotator.tick(frames, display, input) {
            return reason;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyCode;
    use crate::io::input::QueuedInput;
    use crate::models::annotation::Point;
    use crate::models::overlay::{OverlayShape, ShapeStyle};
    use crate::models::session::PlaybackState;
    use crate::ui::LogDisplay;
    use anyhow::{bail, Result};
    use image::RgbaImage;

    /// Blank frames, counting how many were handed out.
    struct CountingSource {
        remaining: usize,
        served: usize,
        fail_after: Option<usize>,
    }

    impl CountingSource {
        fn new(frames: usize) -> Self {
            Self {
                remaining: frames,
                served: 0,
                fail_after: None,
            }
        }
    }

    impl FrameSource for CountingSource {
        fn next_frame(&mut self) -> Result<Option<Frame>> {
            if self.fail_after == Some(self.served) {
                bail!("decode error");
            }
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            self.served += 1;
            Ok(Some(RgbaImage::new(4, 4)))
        }
    }

    fn key(c: char) -> InputEvent {
        InputEvent::Key(KeyCode(c))
    }

    fn click(x: i32, y: i32) -> InputEvent {
        InputEvent::Click(Point::new(x, y))
    }

    fn replay(frames: usize, events: Vec<InputEvent>) -> (StopReason, Annotator, CountingSource) {
        let mut annotator = Annotator::new(KeyBindings::default());
        let mut source = CountingSource::new(frames);
        let mut display = LogDisplay::new();
        let mut input = QueuedInput::scripted(events);
        let reason = run(&mut annotator, &mut source, &mut display, &mut input);
        (reason, annotator, source)
    }

    #[test]
    fn test_plays_to_exhaustion_without_input() {
        let (reason, annotator, source) = replay(3, vec![]);
        assert_eq!(reason, StopReason::Exhausted);
        assert_eq!(source.served, 3);
        assert!(annotator.finish().is_empty());
    }

    #[test]
    fn test_quit_key_stops_while_playing() {
        let (reason, _, source) = replay(10, vec![key('x'), key('q')]);
        assert_eq!(reason, StopReason::Quit);
        assert_eq!(source.served, 1);
    }

    #[test]
    fn test_paused_does_not_advance() {
        let events = vec![key(' '), click(1, 1), click(2, 2), key('u'), key('u'), key('u')];
        let (reason, annotator, source) = replay(10, events);
        assert_eq!(reason, StopReason::InputClosed);
        assert_eq!(source.served, 1);
        assert_eq!(annotator.session().playback(), PlaybackState::Paused);
        assert!(annotator.session().current().is_empty());
    }

    #[test]
    fn test_click_during_playback_never_lands() {
        let events = vec![click(5, 5), key(' '), key('n')];
        let (reason, annotator, source) = replay(3, events);
        assert_eq!(reason, StopReason::InputClosed);
        assert_eq!(source.served, 1);
        assert!(annotator.session().current().is_empty());
        assert!(annotator.session().zones().is_empty());
    }

    #[test]
    fn test_exhaustion_keeps_only_finished_zones() {
        let events = vec![
            key(' '),
            click(10, 20),
            click(50, 20),
            click(50, 80),
            key('n'),
            click(1, 1),
            key(' '),
        ];
        let (reason, annotator, source) = replay(5, events);
        assert_eq!(reason, StopReason::Exhausted);
        assert_eq!(source.served, 5);
        assert_eq!(annotator.session().current().len(), 1);

        let zones = annotator.finish();
        assert_eq!(zones.len(), 1);
        assert_eq!(
            zones.iter().next().unwrap().points(),
            &[Point::new(10, 20), Point::new(50, 20), Point::new(50, 80)]
        );
    }

    #[test]
    fn test_source_failure_stops_loop() {
        let mut annotator = Annotator::new(KeyBindings::default());
        let mut source = CountingSource::new(5);
        source.fail_after = Some(2);
        let mut display = LogDisplay::new();
        let mut input = QueuedInput::scripted(vec![]);

        let reason = run(&mut annotator, &mut source, &mut display, &mut input);
        assert_eq!(reason, StopReason::SourceFailed);
        assert_eq!(display.rendered(), 2);
    }

    #[test]
    fn test_paused_frame_is_redrawn_per_event() {
        let mut annotator = Annotator::new(KeyBindings::default());
        let mut source = CountingSource::new(5);
        let mut display = LogDisplay::new();
        let mut input = QueuedInput::scripted(vec![key(' '), click(1, 1), key('q')]);

        let reason = run(&mut annotator, &mut source, &mut display, &mut input);
        assert_eq!(reason, StopReason::Quit);
        assert_eq!(source.served, 1);
        assert_eq!(display.rendered(), 2);
    }

    /// Keeps every overlay it was asked to draw.
    #[derive(Default)]
    struct RecordingDisplay {
        overlays: Vec<Vec<OverlayShape>>,
    }

    impl DisplaySink for RecordingDisplay {
        fn render(&mut self, _frame: &Frame, overlay: &[OverlayShape]) {
            self.overlays.push(overlay.to_vec());
        }
    }

    #[test]
    fn test_render_shows_each_event_immediately() {
        let mut annotator = Annotator::new(KeyBindings::default());
        let mut source = CountingSource::new(5);
        let mut display = RecordingDisplay::default();
        let mut input = QueuedInput::new();

        let events = [key(' '), click(10, 20), click(50, 20), click(50, 80), key('n')];
        for event in events {
            input.push(event);
            assert_eq!(
                annotator.tick(&mut source, &mut display, &mut input),
                Flow::Continue
            );
            assert_eq!(
                display.overlays.last().unwrap(),
                &overlay::build(annotator.session())
            );
        }

        assert_eq!(annotator.session().zones().len(), 1);
        assert!(matches!(
            display.overlays.last().unwrap().as_slice(),
            [OverlayShape::Outline { closed: true, style: ShapeStyle::Finalized, .. }]
        ));
    }

    #[test]
    fn test_pause_freezes_frame_on_screen() {
        let mut annotator = Annotator::new(KeyBindings::default());
        let mut source = CountingSource::new(5);
        let mut display = LogDisplay::new();
        let mut input = QueuedInput::new();

        annotator.tick(&mut source, &mut display, &mut input);
        annotator.tick(&mut source, &mut display, &mut input);
        assert_eq!(source.served, 2);

        // Pause and click arrive together while frame 2 is shown.
        input.push(key(' '));
        input.push(click(7, 7));
        annotator.tick(&mut source, &mut display, &mut input);
        assert!(annotator.session().is_paused());
        assert_eq!(source.served, 2);

        annotator.tick(&mut source, &mut display, &mut input);
        assert_eq!(source.served, 2);
        assert_eq!(annotator.session().current().points(), &[Point::new(7, 7)]);
    }

    #[test]
    fn test_pause_before_first_frame_still_shows_one() {
        let (reason, _, source) = replay(4, vec![key(' '), click(1, 1)]);
        assert_eq!(reason, StopReason::InputClosed);
        assert_eq!(source.served, 1);
    }

    #[test]
    fn test_rebound_keys() {
        let keys = KeyBindings {
            toggle_pause: KeyCode('p'),
            ..KeyBindings::default()
        };
        let mut annotator = Annotator::new(keys);
        assert_eq!(annotator.handle(key(' ')), Flow::Continue);
        assert!(!annotator.session().is_paused());
        assert_eq!(annotator.handle(key('p')), Flow::Continue);
        assert!(annotator.session().is_paused());
    }
}
