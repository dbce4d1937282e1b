//! Maps a timeline plus a platform profile to an export plan.
//!
//! Checks run in a fixed order and the first failure wins, so a timeline
//! that is both too long and the wrong shape reports the duration. The
//! resolver only reads its inputs; calling it twice on the same snapshot
//! gives the same answer.

use num_rational::Rational64;
use reelkit_core::{
    AspectRatio, FrameRate, MediaCatalog, MediaItem, MediaTime, PixelRect, Resolution,
};
use reelkit_timeline::{Timeline, TrackKind};

use crate::codec::{Container, VideoCodec};
use crate::config::ResolverConfig;
use crate::options::ExportOptions;
use crate::plan::{estimate_size, AspectHandling, ExportPlan, GlobalAdjustment, Rejection};
use crate::platform::PlatformProfile;

/// Decides whether and how a timeline can be exported.
#[derive(Debug, Clone, Default)]
pub struct ExportResolver {
    config: ResolverConfig,
}

impl ExportResolver {
    /// Create a resolver with the given configuration.
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve a plan for `timeline` on the platform described by `profile`.
    pub fn resolve(
        &self,
        timeline: &Timeline,
        catalog: &dyn MediaCatalog,
        profile: &PlatformProfile,
    ) -> Result<ExportPlan, Rejection> {
        self.resolve_with(timeline, catalog, profile, &ExportOptions::default())
    }

    /// [`resolve`](Self::resolve), carrying a watermark and publishing
    /// metadata into the plan. Options never change the verdict.
    pub fn resolve_with(
        &self,
        timeline: &Timeline,
        catalog: &dyn MediaCatalog,
        profile: &PlatformProfile,
        options: &ExportOptions,
    ) -> Result<ExportPlan, Rejection> {
        let result = self.resolve_inner(timeline, catalog, profile, options);
        match &result {
            Ok(plan) => tracing::info!(
                platform = %profile.platform,
                resolution = %plan.resolution,
                codec = %plan.video_codec,
                bitrate = plan.video_bitrate,
                "export plan resolved"
            ),
            Err(rejection) => tracing::info!(
                platform = %profile.platform,
                %rejection,
                "export rejected"
            ),
        }
        result
    }

    fn resolve_inner(
        &self,
        timeline: &Timeline,
        catalog: &dyn MediaCatalog,
        profile: &PlatformProfile,
        options: &ExportOptions,
    ) -> Result<ExportPlan, Rejection> {
        // 1. Emptiness
        let measured = timeline.total_duration();
        if timeline.clip_count() == 0 || measured <= MediaTime::ZERO {
            return Err(Rejection::EmptyTimeline);
        }

        // 2. Duration
        let (duration, adjustments) = fit_duration(measured, profile)?;
        tracing::debug!(%measured, %duration, "duration fits");

        // 3. Geometry
        let source = representative_source(timeline, catalog);
        let (source_resolution, source_rate) = match source {
            Some(item) => (item.resolution, item.frame_rate),
            None => (Resolution::new(0, 0), FrameRate::default()),
        };
        let (resolution, aspect_handling) =
            choose_geometry(source_resolution, profile, self.config.min_crop_coverage)?;
        tracing::debug!(%source_resolution, %resolution, ?aspect_handling, "geometry chosen");

        // 4. Codec and container
        let (video_codec, container) = self.choose_codec(profile)?;

        // 5. Frame rate and bitrate
        let frame_rate = source_rate.min(profile.max_frame_rate);
        let has_audio = timeline_has_audio(timeline, catalog);
        let audio_codec = has_audio.then(|| container.audio_codec());
        let audio_bitrate = if has_audio { self.config.audio_bitrate } else { 0 };
        let video_bitrate = self.video_bitrate(resolution, frame_rate, profile);
        let video_bitrate = self.fit_file_size(video_bitrate, audio_bitrate, duration, profile)?;

        // 6. Assemble
        Ok(ExportPlan {
            platform: profile.platform,
            resolution,
            frame_rate,
            video_codec,
            audio_codec,
            container,
            video_bitrate,
            audio_bitrate,
            aspect_handling,
            source_resolution,
            source_duration: measured,
            duration,
            adjustments,
            required_metadata: profile.required_metadata.clone(),
            watermark: options.watermark.as_ref().map(|w| w.normalized()),
            custom_metadata: options.custom_metadata.clone(),
        })
    }

    /// First profile codec the encoder supports that also has a container.
    fn choose_codec(&self, profile: &PlatformProfile) -> Result<(VideoCodec, Container), Rejection> {
        profile
            .video_codecs
            .iter()
            .filter(|codec| self.config.encoder_supports(**codec))
            .find_map(|&codec| {
                profile
                    .containers
                    .iter()
                    .find(|container| container.supports(codec))
                    .map(|&container| (codec, container))
            })
            .ok_or(Rejection::NoCompatibleCodec {
                platform: profile.platform,
            })
    }

    /// Pixel-rate heuristic capped at the platform ceiling.
    ///
    /// Never below 1 bps, unless the ceiling itself is zero.
    fn video_bitrate(&self, resolution: Resolution, rate: FrameRate, profile: &PlatformProfile) -> u64 {
        let target = (resolution.pixel_count() as f64
            * rate.to_fps_f64()
            * self.config.effective_bits_per_pixel())
        .round();
        (target as u64).max(1).min(profile.max_bitrate)
    }

    /// Lower the video bitrate until the estimated size fits the upload cap.
    fn fit_file_size(
        &self,
        video_bitrate: u64,
        audio_bitrate: u64,
        duration: MediaTime,
        profile: &PlatformProfile,
    ) -> Result<u64, Rejection> {
        let Some(limit) = profile.max_file_size else {
            return Ok(video_bitrate);
        };
        let estimated = estimate_size(video_bitrate + audio_bitrate, duration);
        if estimated <= limit {
            return Ok(video_bitrate);
        }

        let micros = duration.as_micros().max(1) as u128;
        let budget = limit as u128 * 8 * MediaTime::MICROS_PER_SECOND as u128 / micros;
        let video_budget = u64::try_from(budget)
            .unwrap_or(u64::MAX)
            .saturating_sub(audio_bitrate);
        if video_budget < self.config.min_video_bitrate {
            return Err(Rejection::FileSizeTooLarge { estimated, limit });
        }
        tracing::debug!(from = video_bitrate, to = video_budget, "bitrate lowered for size cap");
        Ok(video_budget)
    }
}

/// Check duration bounds, speeding the timeline up when the profile allows it.
fn fit_duration(
    measured: MediaTime,
    profile: &PlatformProfile,
) -> Result<(MediaTime, Vec<GlobalAdjustment>), Rejection> {
    let limit = profile.max_duration;
    if measured > limit {
        if profile.allow_speed_adjust && limit > MediaTime::ZERO {
            let factor = Rational64::new(measured.as_micros(), limit.as_micros());
            if factor <= profile.max_speed_factor {
                tracing::debug!(%factor, "speeding up to fit duration limit");
                return Ok((limit, vec![GlobalAdjustment::SpeedChange { factor }]));
            }
        }
        return Err(Rejection::DurationTooLong { measured, limit });
    }
    if measured < profile.min_duration {
        return Err(Rejection::DurationTooShort {
            measured,
            limit: profile.min_duration,
        });
    }
    Ok((measured, Vec::new()))
}

/// Media of the largest first clip across the video tracks.
///
/// Ties go to the earlier track. Clips whose media is missing from the
/// catalog are skipped.
fn representative_source<'a>(
    timeline: &Timeline,
    catalog: &'a dyn MediaCatalog,
) -> Option<&'a MediaItem> {
    timeline
        .tracks()
        .iter()
        .filter(|track| track.kind == TrackKind::Video)
        .filter_map(|track| track.clips().first())
        .filter_map(|clip| catalog.media_item(&clip.media_id))
        .filter(|item| item.has_video())
        .fold(None, |best: Option<&MediaItem>, item| match best {
            Some(b) if b.resolution.pixel_count() >= item.resolution.pixel_count() => Some(b),
            _ => Some(item),
        })
}

/// Whether any enabled clip on an unmuted track carries sound.
fn timeline_has_audio(timeline: &Timeline, catalog: &dyn MediaCatalog) -> bool {
    timeline
        .tracks()
        .iter()
        .filter(|track| !track.muted)
        .flat_map(|track| track.clips())
        .filter(|clip| clip.enabled)
        .filter_map(|clip| catalog.media_item(&clip.media_id))
        .any(|item| item.has_audio)
}

/// Pick the output size and how the source maps onto it.
///
/// Preference: (a) a resolution with the source's exact ratio, (b) the
/// nearest ratio by centered crop when the crop keeps at least
/// `min_crop_coverage` of the frame, (c) the nearest ratio letterboxed.
pub(crate) fn choose_geometry(
    source: Resolution,
    profile: &PlatformProfile,
    min_crop_coverage: f64,
) -> Result<(Resolution, AspectHandling), Rejection> {
    let candidates: Vec<Resolution> = profile
        .resolutions
        .iter()
        .copied()
        .filter(|r| {
            profile.aspect_ratios.is_empty() || profile.aspect_ratios.contains(&r.aspect_ratio())
        })
        .collect();
    let Some(&first) = candidates.first() else {
        return Err(Rejection::NoCompatibleResolution {
            measured: source,
            platform: profile.platform,
        });
    };

    // Audio-only timeline: no frame to adapt.
    if source.is_empty() {
        return Ok((first, AspectHandling::Native));
    }

    let source_ratio = source.aspect_ratio();
    let exact = with_ratio(&candidates, source_ratio);
    if !exact.is_empty() {
        return Ok((best_fit(&exact, source), AspectHandling::Native));
    }

    // Nearest ratio; ties go to the earlier candidate.
    let target = candidates
        .iter()
        .map(|r| r.aspect_ratio())
        .fold(first.aspect_ratio(), |best, ratio| {
            if source_ratio.coverage(ratio) > source_ratio.coverage(best) {
                ratio
            } else {
                best
            }
        });
    let options = with_ratio(&candidates, target);

    if source_ratio.coverage(target) >= min_crop_coverage {
        let rect = PixelRect::centered_fit(source, target);
        let output = best_fit(&options, rect.size());
        Ok((output, AspectHandling::Crop { rect }))
    } else {
        let output = best_fit(&options, enclosing_frame(source, target));
        let content = PixelRect::centered_fit(output, source_ratio);
        Ok((output, AspectHandling::Letterbox { content }))
    }
}

fn with_ratio(candidates: &[Resolution], ratio: AspectRatio) -> Vec<Resolution> {
    candidates
        .iter()
        .copied()
        .filter(|r| r.aspect_ratio() == ratio)
        .collect()
}

/// Largest option that fits inside `bound` (no upscaling), else the smallest.
fn best_fit(options: &[Resolution], bound: Resolution) -> Resolution {
    let fitting = options
        .iter()
        .filter(|r| r.fits_within(bound))
        .fold(None, |best: Option<Resolution>, &r| match best {
            Some(b) if b.pixel_count() >= r.pixel_count() => Some(b),
            _ => Some(r),
        });
    fitting
        .or_else(|| {
            options.iter().copied().fold(None, |best: Option<Resolution>, r| match best {
                Some(b) if b.pixel_count() <= r.pixel_count() => Some(b),
                _ => Some(r),
            })
        })
        .unwrap_or(bound)
}

/// Smallest frame of `ratio` that contains `source` at its native scale.
fn enclosing_frame(source: Resolution, ratio: AspectRatio) -> Resolution {
    let (w, h) = (source.width as u64, source.height as u64);
    let (rw, rh) = (ratio.width() as u64, ratio.height() as u64);
    if w * rh > rw * h {
        Resolution::new(source.width, (w * rh).div_ceil(rw) as u32)
    } else {
        Resolution::new((h * rw).div_ceil(rh) as u32, source.height)
    }
}
