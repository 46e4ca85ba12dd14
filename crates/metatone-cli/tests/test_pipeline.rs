//! End-to-end pipeline tests with fake FluidSynth and So-VITS-SVC.

#![cfg(unix)]

use std::fs;
use std::io::Cursor;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use metatone_backend_audio::AudioFormat;
use metatone_backend_music::parse_score;
use metatone_cli::{Pipeline, Stage};
use metatone_spec::{ErrorKind, LyricText, MetatoneConfig, Pitch};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

struct World {
    dir: TempDir,
}

impl World {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        fs::write(root.join("bank.sf2"), b"sfbk").unwrap();
        fs::write(root.join("rough.wav"), fixture_wav()).unwrap();

        let fluidsynth = root.join("fluidsynth");
        fs::write(
            &fluidsynth,
            format!("#!/bin/sh\ncp \"{}\" \"$5\"\n", root.join("rough.wav").display()),
        )
        .unwrap();
        fs::set_permissions(&fluidsynth, fs::Permissions::from_mode(0o755)).unwrap();

        let repo = root.join("svc");
        fs::create_dir_all(repo.join("logs")).unwrap();
        fs::write(repo.join("logs/G_800.pth"), b"weights").unwrap();
        fs::write(repo.join("config.json"), b"{}").unwrap();
        fs::write(
            repo.join("infer.sh"),
            "mkdir -p results\n\
             { printf 'fLaC'; cat \"raw/$6.wav\"; } > \"results/$6_$8key_${10}_sovits_pm.flac\"\n",
        )
        .unwrap();

        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn config(&self) -> MetatoneConfig {
        let mut config = MetatoneConfig {
            soundfont: Some(self.root().join("bank.sf2")),
            debug_dump_dir: Some(self.root().join("dump")),
            ..Default::default()
        };
        config.renderer.fluidsynth_path = Some(self.root().join("fluidsynth"));
        config.voice_conversion.repo_dir = Some(self.root().join("svc"));
        config.voice_conversion.python = PathBuf::from("sh");
        config.voice_conversion.script = PathBuf::from("infer.sh");
        config.voice_conversion.model_path = Some(PathBuf::from("logs/G_800.pth"));
        config.voice_conversion.config_path = Some(PathBuf::from("config.json"));
        config
    }
}

fn fixture_wav() -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..441i16 {
            writer.write_sample(i * 10).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

#[test]
fn test_sing_with_conversion() {
    let world = World::new();
    let pipeline = Pipeline::new(world.config()).unwrap();
    pipeline
        .validate(&[Stage::Compose, Stage::Render, Stage::Convert])
        .unwrap();

    let lyrics = LyricText::parse("Colors fade\n\nStars ignite tonight");
    let performance = pipeline.sing(&lyrics, Some("Night"), true).unwrap();

    let score = &performance.composition.score;
    assert_eq!(score.notes[0].pitch, Pitch::C4);
    assert_eq!(parse_score(&performance.composition.midi).unwrap(), *score);

    assert_eq!(performance.rough.format, AudioFormat::Wav);
    assert_eq!(performance.rough.data, fixture_wav());

    let converted = performance.converted.unwrap();
    assert_eq!(converted.format, AudioFormat::Flac);
    assert!(converted.data.starts_with(b"fLaC"));
    assert_eq!(&converted.data[4..], fixture_wav().as_slice());

    // Debug dump keeps the intermediates; the converter leaves nothing behind.
    assert_eq!(
        fs::read(world.root().join("dump/score.mid")).unwrap(),
        performance.composition.midi
    );
    assert_eq!(fs::read(world.root().join("dump/rough.wav")).unwrap(), fixture_wav());
    assert!(!world.root().join("svc/raw/temp_infer.wav").exists());
    assert!(fs::read_dir(world.root().join("svc/results"))
        .unwrap()
        .next()
        .is_none());
}

#[test]
fn test_sing_without_conversion_skips_converter() {
    let world = World::new();
    let mut config = world.config();
    config.voice_conversion.repo_dir = None;

    let pipeline = Pipeline::new(config).unwrap();
    let performance = pipeline
        .sing(&LyricText::parse("Hello world"), None, false)
        .unwrap();
    assert!(performance.converted.is_none());
    assert!(!performance.rough.data.is_empty());
}

#[test]
fn test_missing_converter_model_fails_before_rendering() {
    let world = World::new();
    let mut config = world.config();
    config.voice_conversion.model_path = Some(PathBuf::from("logs/missing.pth"));

    let pipeline = Pipeline::new(config).unwrap();
    let err = pipeline
        .sing(&LyricText::parse("Hello world"), None, true)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ResourceMissing);
    assert_eq!(err.code, "SVC_004");
    assert!(!world.root().join("dump").exists());
}

#[test]
fn test_renderer_failure_is_invocation_failed() {
    let world = World::new();
    let fluidsynth = world.root().join("fluidsynth");
    fs::write(&fluidsynth, "#!/bin/sh\necho 'bad soundfont' 1>&2\nexit 1\n").unwrap();

    let pipeline = Pipeline::new(world.config()).unwrap();
    let err = pipeline
        .sing(&LyricText::parse("Hello world"), None, false)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvocationFailed);
    assert!(err.message.contains("bad soundfont"));
}
