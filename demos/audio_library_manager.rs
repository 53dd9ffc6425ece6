use std::path::{Path, PathBuf};
use vigi_rs::{Authentication, AudioConverter, AudioLibrary, CameraConfig, VigiCam};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 5 {
        println!("Usage: {} <IP> <Username> <Password> <audio-file>...", args[0]);
        std::process::exit(1);
    }

    // The camera only accepts G.711, so convert everything up front.
    let converter = AudioConverter::new();
    let output_dir = std::env::temp_dir().join("vigi_custom_audio");
    let mut converted: Vec<PathBuf> = Vec::new();
    for input in &args[4..] {
        let path = converter
            .convert_to_file(Path::new(input), &output_dir)
            .await?;
        println!("Converted {input} -> {}", path.display());
        converted.push(path);
    }

    let mut cam = VigiCam::new(CameraConfig {
        host: args[1].clone(),
        username: args[2].clone(),
        password: args[3].clone(),
    });

    cam.authenticate().await?;

    println!("Syncing {} file(s) into the custom audio slots...", converted.len());
    for result in cam.sync_custom_audios(&converted).await {
        match (result.slot, &result.outcome) {
            (Some(slot), Ok(())) => println!("  {} -> slot {slot}", result.file.display()),
            (Some(slot), Err(e)) => {
                eprintln!("  {} -> slot {slot} failed: {e}", result.file.display())
            }
            (None, Err(e)) => eprintln!("  {} skipped: {e}", result.file.display()),
            (None, Ok(())) => {}
        }
    }

    println!("\nCustom sounds on the camera:");
    for audio in cam.get_custom_audio_list().await? {
        println!("  {} - '{}'", audio.id, audio.name);
    }

    Ok(())
}
