use chrono::NaiveDate;
use rand::{rngs::SmallRng, SeedableRng};
use tracing::{debug, info};

use crate::{
    config::Config,
    error::Result,
    export::{Delivery, DeliveryKind, ExportJob, ExportReceipt},
    render::{layout, Composite},
    session::{
        history::History,
        metadata::{ExifReader, KamadakExif, MetadataDeriver, PhotoMetadata},
        notify::{Level, Notification, Notifier},
        schedule::{Clock, Debouncer, SystemClock},
        shortcuts::{Command, KeyChord},
        state::CompositionState,
    },
    source::{EmbeddedImage, SourceImage},
};

/// One editing session: the composition, its photo and its history
///
/// The session is the single owner of all mutable state. Asynchronous work
/// (loading, exporting) happens outside and reports back through
/// [`Session::replace_image`] and [`Session::finish_export`]; whichever result
/// is applied last wins.
///
/// Time only moves through the [`Clock`]. Call [`Session::tick`] regularly so
/// the debounced history capture can run.
pub struct Session<C: Clock = SystemClock> {
    state: CompositionState,
    metadata: PhotoMetadata,
    source: Option<SourceImage>,

    history: History,
    snapshot_timer: Debouncer,
    suppress_capture: bool,

    notifier: Notifier,
    exporting: bool,
    copying: bool,

    clock: C,
    deriver: MetadataDeriver<SmallRng>,
    exif: Box<dyn ExifReader>,
    today: Option<NaiveDate>,
}

impl<C: Clock> Session<C> {
    /// Session with the system EXIF reader and an entropy-seeded generator
    pub fn new(config: &Config, clock: C) -> Self {
        Self::with_parts(config, clock, SmallRng::from_entropy(), Box::new(KamadakExif))
    }

    pub fn with_parts(config: &Config, clock: C, rng: SmallRng, exif: Box<dyn ExifReader>) -> Self {
        let state = CompositionState::new();
        let mut history = History::new(config.history.capacity);
        history.capture(state.clone());

        Self {
            state,
            metadata: PhotoMetadata::defaults(chrono::Local::now().date_naive()),
            source: None,
            history,
            snapshot_timer: Debouncer::new(config.history.debounce_ms),
            suppress_capture: false,
            notifier: Notifier::new(config.notify.duration_ms),
            exporting: false,
            copying: false,
            clock,
            deriver: MetadataDeriver::new(rng),
            exif,
            today: None,
        }
    }

    /// Pin the date used for fresh metadata
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = Some(today);
        self.metadata.date = crate::session::metadata::display_date(today);
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    pub fn state(&self) -> &CompositionState {
        &self.state
    }

    pub fn metadata(&self) -> &PhotoMetadata {
        &self.metadata
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Mutate the composition through its setters
    ///
    /// A capture is scheduled only when something actually changed. Returns
    /// whether it did.
    pub fn update<F: FnOnce(&mut CompositionState)>(&mut self, f: F) -> bool {
        let before = self.state.clone();
        f(&mut self.state);
        if self.state == before {
            return false;
        }
        self.state_changed();
        true
    }

    /// Restore the default composition and default metadata
    pub fn reset(&mut self) {
        self.update(CompositionState::reset);
        self.metadata = PhotoMetadata::defaults(self.today());
        info!("Composition reset to defaults");
    }

    fn state_changed(&mut self) {
        if self.suppress_capture {
            self.suppress_capture = false;
            self.snapshot_timer.cancel();
            return;
        }
        self.snapshot_timer.schedule(self.clock.now());
    }

    fn reapply(&mut self, snapshot: CompositionState) {
        self.suppress_capture = true;
        self.state = snapshot;
        self.state_changed();
    }

    /// Run whatever has come due; returns true when a snapshot was taken
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        self.notifier.dismiss_expired(now);

        if !self.snapshot_timer.poll(now) {
            return false;
        }
        self.history.capture(self.state.clone());
        debug!("History snapshot taken ({} entries)", self.history.len());
        true
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.reapply(snapshot);
                debug!("Undo ({} entries, {} redo)", self.history.len(), self.history.redo_len());
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.reapply(snapshot);
                debug!("Redo ({} entries, {} redo)", self.history.len(), self.history.redo_len());
                true
            }
            None => false,
        }
    }

    /// Dispatch a keyboard shortcut; returns the command it triggered
    pub fn handle_key(&mut self, chord: KeyChord) -> Option<Command> {
        let command = chord.command()?;
        match command {
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
        };
        Some(command)
    }

    /// Install the first photo without touching the metadata
    pub fn load_initial(&mut self, source: SourceImage) {
        debug!("Initial image: {:?}", source.dimensions());
        self.source = Some(source);
    }

    /// Swap in a newly loaded photo and derive its metadata
    pub fn replace_image(&mut self, image: EmbeddedImage) {
        let today = self.today();
        self.metadata = self.deriver.derive(image.bytes(), self.exif.as_ref(), today);
        info!(
            "New photo {}x{}: {} {} {}",
            image.dimensions().0,
            image.dimensions().1,
            self.metadata.iso,
            self.metadata.aperture,
            self.metadata.shutter_speed
        );
        self.source = Some(SourceImage::Embedded(image));
    }

    /// The current layer stack
    pub fn composite(&self) -> Composite {
        layout::render(&self.state, &self.metadata, self.source.as_ref())
    }

    fn busy_flag(&mut self, kind: DeliveryKind) -> &mut bool {
        match kind {
            DeliveryKind::Download => &mut self.exporting,
            DeliveryKind::Clipboard => &mut self.copying,
        }
    }

    pub fn is_busy(&self, kind: DeliveryKind) -> bool {
        match kind {
            DeliveryKind::Download => self.exporting,
            DeliveryKind::Clipboard => self.copying,
        }
    }

    /// Snapshot what the exporter needs and mark the delivery busy
    ///
    /// Returns `None` while the same kind of delivery is still running.
    pub fn begin_export(&mut self, delivery: Delivery) -> Option<ExportJob> {
        let busy = self.busy_flag(delivery.kind());
        if *busy {
            debug!("{:?} already in progress", delivery.kind());
            return None;
        }
        *busy = true;

        Some(ExportJob {
            composite: self.composite(),
            source: self.source.clone(),
            delivery,
        })
    }

    /// Clear the busy flag and tell the user how it went
    pub fn finish_export(&mut self, kind: DeliveryKind, result: &Result<ExportReceipt>) {
        *self.busy_flag(kind) = false;
        let now = self.clock.now();

        match result {
            Ok(ExportReceipt::Saved { path }) => {
                self.notifier.post(Level::Info, format!("Saved {}", path.display()), now)
            }
            Ok(ExportReceipt::Copied { .. }) => {
                self.notifier.post(Level::Info, "Copied to clipboard", now)
            }
            Err(e) => {
                debug!("Export failed: {}", e);
                self.notifier.post(Level::Error, e.user_message(), now)
            }
        }
    }

    /// Notifications that have not yet expired
    pub fn notifications(&self) -> Vec<&Notification> {
        self.notifier.active(self.clock.now()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AspectRatio, FilmStock, PaperType};
    use crate::error::{ExportError, ImageError};
    use crate::session::metadata::{ExifTags, TAG_EXPOSURE_TIME, TAG_F_NUMBER, TAG_ISO};
    use crate::session::schedule::ManualClock;
    use crate::source::types::tests::png_bytes;
    use std::path::PathBuf;

    struct FixedTags(ExifTags);

    impl ExifReader for FixedTags {
        fn read_tags(&self, _bytes: &[u8]) -> Result<ExifTags> {
            Ok(self.0.clone())
        }
    }

    struct NoExif;

    impl ExifReader for NoExif {
        fn read_tags(&self, _bytes: &[u8]) -> Result<ExifTags> {
            Err(ImageError::DecodeFailed { reason: "none".into() }.into())
        }
    }

    fn session_with(exif: Box<dyn ExifReader>) -> (Session<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let mut session = Session::with_parts(&Config::default(), clock.clone(), SmallRng::seed_from_u64(42), exif);
        session.set_today(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        (session, clock)
    }

    fn session() -> (Session<ManualClock>, ManualClock) {
        session_with(Box::new(NoExif))
    }

    /// Mutate, then let the debounce run out
    fn settle<F: FnOnce(&mut CompositionState)>(session: &mut Session<ManualClock>, clock: &ManualClock, f: F) {
        session.update(f);
        clock.advance(500);
        session.tick();
    }

    #[test]
    fn test_history_starts_with_initial_state() {
        let (session, _) = session();
        assert_eq!(session.history().len(), 1);
        assert!(!session.history().can_undo());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let (mut session, _) = session();
        session.update(|s| {
            s.set_film_stock(FilmStock::Cinestill800T);
            s.set_paper(PaperType::MatteBlack);
            s.set_caption("Night bus");
            s.set_warmth(80);
        });
        session.replace_image(EmbeddedImage::decode(png_bytes(2, 2, [0, 0, 0, 255])).unwrap());

        session.reset();
        assert_eq!(session.state(), &CompositionState::default());
        assert_eq!(session.metadata(), &PhotoMetadata::defaults(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
    }

    #[test]
    fn test_rapid_changes_coalesce() {
        let (mut session, clock) = session();
        for value in [10, 20, 30, 40, 50] {
            session.update(|s| s.set_vignette(value));
            clock.advance(100);
            assert!(!session.tick());
        }
        clock.advance(400);
        assert!(session.tick());
        assert_eq!(session.history().len(), 2);
        assert!(!session.tick());
    }

    #[test]
    fn test_no_op_update_schedules_nothing() {
        let (mut session, clock) = session();
        assert!(!session.update(|s| s.set_grain(50)));
        clock.advance(1000);
        assert!(!session.tick());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_history_keeps_latest_twenty() {
        let (mut session, clock) = session();
        for value in 1..=25 {
            settle(&mut session, &clock, |s| s.set_grain(value));
        }
        assert_eq!(session.history().len(), 20);
        let grains: Vec<u8> = session.history().entries().map(|s| s.grain().get()).collect();
        assert_eq!(grains, (6..=25).collect::<Vec<u8>>());
    }

    #[test]
    fn test_undo_then_redo_round_trips() {
        let (mut session, clock) = session();
        settle(&mut session, &clock, |s| s.set_aspect_ratio(AspectRatio::Square));
        settle(&mut session, &clock, |s| s.set_caption("Second"));
        let before_undo = session.state().clone();

        assert!(session.undo());
        assert_eq!(session.state().caption().as_str(), "Memoir. No. 001");
        assert_eq!(session.state().aspect_ratio(), AspectRatio::Square);

        // Reapplying a snapshot is not itself recorded
        clock.advance(1000);
        assert!(!session.tick());

        assert!(session.redo());
        assert_eq!(session.state(), &before_undo);
        assert!(!session.redo());
    }

    #[test]
    fn test_undo_needs_two_entries() {
        let (mut session, _) = session();
        assert!(!session.undo());
        assert_eq!(session.state(), &CompositionState::default());
    }

    #[test]
    fn test_new_change_clears_redo() {
        let (mut session, clock) = session();
        settle(&mut session, &clock, |s| s.set_warmth(30));
        settle(&mut session, &clock, |s| s.set_warmth(60));
        session.undo();
        assert!(session.history().can_redo());

        settle(&mut session, &clock, |s| s.set_paper(PaperType::Kraft));
        assert!(!session.history().can_redo());
        assert!(!session.redo());
    }

    #[test]
    fn test_undo_cancels_pending_capture() {
        let (mut session, clock) = session();
        settle(&mut session, &clock, |s| s.set_grain(10));
        session.update(|s| s.set_grain(90));
        session.undo();

        clock.advance(1000);
        assert!(!session.tick());
        assert_eq!(session.state().grain().get(), 50);
        assert_eq!(session.history().len(), 1);

        // The suppression is one-shot
        session.update(|s| s.set_grain(70));
        clock.advance(500);
        assert!(session.tick());
    }

    #[test]
    fn test_keyboard_shortcuts() {
        let (mut session, clock) = session();
        settle(&mut session, &clock, |s| s.set_vignette(80));

        let undo = KeyChord::parse("ctrl+z").unwrap();
        assert_eq!(session.handle_key(undo), Some(Command::Undo));
        assert_eq!(session.state().vignette().get(), 20);

        let redo = KeyChord::parse("cmd+y").unwrap();
        assert_eq!(session.handle_key(redo), Some(Command::Redo));
        assert_eq!(session.state().vignette().get(), 80);

        assert_eq!(session.handle_key(KeyChord::parse("ctrl+s").unwrap()), None);
    }

    #[test]
    fn test_replace_image_uses_embedded_f_number() {
        let tags: ExifTags = [(TAG_F_NUMBER.to_string(), "2.0".to_string())].into_iter().collect();
        let (mut session, _) = session_with(Box::new(FixedTags(tags)));
        session.replace_image(EmbeddedImage::decode(png_bytes(4, 4, [9, 9, 9, 255])).unwrap());

        assert_eq!(session.metadata().aperture, "ƒ/2.0");
        assert_eq!(session.metadata().date, "FEB 29, 2024");
        assert_eq!(session.source().and_then(SourceImage::dimensions), Some((4, 4)));
    }

    /// Embedded tags for the first image read, nothing afterwards
    struct FirstImageTagged(std::sync::atomic::AtomicBool);

    impl ExifReader for FirstImageTagged {
        fn read_tags(&self, _bytes: &[u8]) -> Result<ExifTags> {
            if self.0.swap(false, std::sync::atomic::Ordering::SeqCst) {
                Ok([
                    (TAG_ISO.to_string(), "3200".to_string()),
                    (TAG_EXPOSURE_TIME.to_string(), "1/4000".to_string()),
                ]
                .into_iter()
                .collect())
            } else {
                Err(ImageError::DecodeFailed { reason: "no exif".into() }.into())
            }
        }
    }

    #[test]
    fn test_second_image_rolls_fresh_values() {
        let (mut session, _) = session_with(Box::new(FirstImageTagged(true.into())));
        let today = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let mut rolls = MetadataDeriver::new(SmallRng::seed_from_u64(42));
        let _first = rolls.random(today);
        let second = rolls.random(today);

        session.replace_image(EmbeddedImage::decode(png_bytes(4, 4, [1, 2, 3, 255])).unwrap());
        assert_eq!(session.metadata().iso, "ISO 3200");
        assert_eq!(session.metadata().shutter_speed, "1/4000");

        session.replace_image(EmbeddedImage::decode(png_bytes(5, 5, [4, 5, 6, 255])).unwrap());
        assert_eq!(session.metadata().iso, second.iso);
        assert_eq!(session.metadata().shutter_speed, second.shutter_speed);
        assert_eq!(session.metadata().aperture, second.aperture);
        assert_ne!(session.metadata().shutter_speed, "1/4000");
    }

    #[test]
    fn test_last_load_wins() {
        let (mut session, _) = session();
        session.load_initial(SourceImage::Remote { url: "https://picsum.photos/800/1000".into() });
        session.replace_image(EmbeddedImage::decode(png_bytes(3, 5, [0, 0, 0, 255])).unwrap());
        session.replace_image(EmbeddedImage::decode(png_bytes(7, 2, [0, 0, 0, 255])).unwrap());
        assert_eq!(session.source().and_then(SourceImage::dimensions), Some((7, 2)));
    }

    #[test]
    fn test_export_busy_flags_are_per_delivery() {
        let (mut session, _) = session();
        let download = Delivery::Download { dir: PathBuf::from("prints") };

        assert!(session.begin_export(download.clone()).is_some());
        assert!(session.is_busy(DeliveryKind::Download));
        assert!(session.begin_export(download.clone()).is_none());
        assert!(session.begin_export(Delivery::Clipboard).is_some());

        session.finish_export(DeliveryKind::Download, &Ok(ExportReceipt::Saved { path: PathBuf::from("prints/a.png") }));
        assert!(!session.is_busy(DeliveryKind::Download));
        assert!(session.begin_export(download).is_some());
    }

    #[test]
    fn test_export_failure_becomes_transient_notification() {
        let (mut session, clock) = session();
        let before = session.state().clone();
        session.begin_export(Delivery::Clipboard);
        session.finish_export(
            DeliveryKind::Clipboard,
            &Err(ExportError::ClipboardRejected { reason: "denied".into() }.into()),
        );

        let active = session.notifications();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].level, Level::Error);
        assert!(active[0].message.contains("clipboard"));
        assert_eq!(session.state(), &before);

        clock.advance(3000);
        session.tick();
        assert!(session.notifications().is_empty());
    }

    #[test]
    fn test_export_job_carries_current_composite() {
        let (mut session, _) = session();
        session.update(|s| s.set_film_stock(FilmStock::IlfordHp5));
        let job = session.begin_export(Delivery::Clipboard).unwrap();
        assert_eq!(job.composite, session.composite());
        assert!(job.source.is_none());
    }
}
