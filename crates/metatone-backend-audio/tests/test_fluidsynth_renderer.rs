//! Renderer tests against a fake `fluidsynth` executable.
//!
//! The fake is a shell script that checks its arguments the way FluidSynth
//! receives them (`-ni <sf2> <in.mid> -F <out.wav> -r <rate>`) and then
//! behaves as each test needs.

#![cfg(unix)]

use std::fs;
use std::io::Cursor;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use metatone_backend_audio::{
    AudioError, AudioFormat, AudioRenderer, FluidSynthConfig, FluidSynthRenderer,
};
use metatone_spec::{BackendError, ErrorKind};
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    temp_root: PathBuf,
    soundfont: PathBuf,
    wav: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let temp_root = dir.path().join("scratch");
        fs::create_dir(&temp_root).unwrap();

        let soundfont = dir.path().join("VocalsPapel.sf2");
        fs::write(&soundfont, b"sfbk").unwrap();

        let wav = dir.path().join("fixture.wav");
        fs::write(&wav, fixture_wav()).unwrap();

        Self {
            dir,
            temp_root,
            soundfont,
            wav,
        }
    }

    fn fake_fluidsynth(&self, body: &str) -> PathBuf {
        let path = self.dir.path().join("fluidsynth");
        let script = format!("#!/bin/sh\n{body}\n");
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn renderer(&self, fluidsynth: &Path) -> FluidSynthRenderer {
        FluidSynthRenderer::with_config(
            FluidSynthConfig::default()
                .soundfont(&self.soundfont)
                .fluidsynth_path(fluidsynth)
                .timeout(Duration::from_secs(20))
                .temp_root(&self.temp_root),
        )
    }

    fn scratch_is_empty(&self) -> bool {
        fs::read_dir(&self.temp_root).unwrap().next().is_none()
    }
}

fn fixture_wav() -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..4410i32 {
            let s = ((i % 64) - 32) as i16 * 512;
            writer.write_sample(s).unwrap();
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Minimal valid SMF header; the fake synthesizer never parses it.
const MIDI: &[u8] = b"MThd\0\0\0\x06\0\0\0\x01\x01\xe0";

#[test]
fn test_render_success() {
    let fx = Fixture::new();
    let fake = fx.fake_fluidsynth(&format!(
        r#"[ "$1" = "-ni" ] || exit 9
test -f "$2" || exit 8
test -f "$3" || exit 7
[ "$4" = "-F" ] || exit 6
[ "$6" = "-r" ] && [ "$7" = "44100" ] || exit 5
cp "{}" "$5""#,
        fx.wav.display()
    ));

    let audio = fx.renderer(&fake).render(MIDI).unwrap();
    assert_eq!(audio.format, AudioFormat::Wav);
    assert_eq!(audio.data, fixture_wav());
    let info = audio.info.unwrap();
    assert_eq!(info.sample_rate, 44100);
    assert_eq!(info.frames, 4410);
    assert_eq!(audio.pcm_hash.unwrap().len(), 64);
    assert!(fx.scratch_is_empty());
}

#[test]
fn test_staged_midi_matches_input() {
    let fx = Fixture::new();
    let copy = fx.dir.path().join("seen.mid");
    let fake = fx.fake_fluidsynth(&format!(
        r#"cp "$3" "{}"
cp "{}" "$5""#,
        copy.display(),
        fx.wav.display()
    ));

    fx.renderer(&fake).render(MIDI).unwrap();
    assert_eq!(fs::read(copy).unwrap(), MIDI);
}

#[test]
fn test_missing_soundfont_leaves_no_temp_files() {
    let fx = Fixture::new();
    let fake = fx.fake_fluidsynth("exit 0");
    let renderer = FluidSynthRenderer::with_config(
        FluidSynthConfig::default()
            .soundfont(fx.dir.path().join("missing.sf2"))
            .fluidsynth_path(&fake)
            .temp_root(&fx.temp_root),
    );

    let err = renderer.render(MIDI).unwrap_err();
    assert!(matches!(err, AudioError::SoundFontNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::ResourceMissing);
    assert!(err.to_string().contains("missing.sf2"));
    assert!(fx.scratch_is_empty());
}

#[test]
fn test_non_zero_exit_carries_stderr() {
    let fx = Fixture::new();
    let fake = fx.fake_fluidsynth(
        r#"echo "fluidsynth: error: Failed to load SoundFont" 1>&2
exit 3"#,
    );

    let err = fx.renderer(&fake).render(MIDI).unwrap_err();
    match &err {
        AudioError::ProcessFailed { exit_code, stderr } => {
            assert_eq!(*exit_code, 3);
            assert!(stderr.contains("Failed to load SoundFont"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::InvocationFailed);
    assert!(fx.scratch_is_empty());
}

#[test]
fn test_success_without_output_is_output_missing() {
    let fx = Fixture::new();
    let fake = fx.fake_fluidsynth("exit 0");

    let err = fx.renderer(&fake).render(MIDI).unwrap_err();
    assert!(matches!(err, AudioError::OutputNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::OutputMissing);
    assert!(fx.scratch_is_empty());
}

#[test]
fn test_unparseable_output_is_output_missing() {
    let fx = Fixture::new();
    let fake = fx.fake_fluidsynth(r#"printf 'not a wav' > "$5""#);

    let err = fx.renderer(&fake).render(MIDI).unwrap_err();
    assert!(matches!(err, AudioError::InvalidWav(_)));
    assert_eq!(err.kind(), ErrorKind::OutputMissing);
    assert!(fx.scratch_is_empty());
}

#[test]
fn test_timeout_kills_process() {
    let fx = Fixture::new();
    let fake = fx.fake_fluidsynth("exec sleep 30");
    let renderer = FluidSynthRenderer::with_config(
        FluidSynthConfig::default()
            .soundfont(&fx.soundfont)
            .fluidsynth_path(&fake)
            .timeout(Duration::from_millis(300))
            .temp_root(&fx.temp_root),
    );

    let err = renderer.render(MIDI).unwrap_err();
    assert!(matches!(err, AudioError::Timeout { .. }));
    assert_eq!(err.kind(), ErrorKind::InvocationFailed);
    assert!(fx.scratch_is_empty());
}

#[test]
fn test_sample_rate_is_forwarded() {
    let fx = Fixture::new();
    let fake = fx.fake_fluidsynth(&format!(
        r#"[ "$7" = "22050" ] || exit 4
cp "{}" "$5""#,
        fx.wav.display()
    ));
    let renderer = FluidSynthRenderer::with_config(
        fx.renderer(&fake).config().clone().sample_rate(22050),
    );
    assert!(renderer.render(MIDI).is_ok());
}
