use std::time::Duration;
use vigi_rs::{Alarm, AlarmAction, Authentication, CameraConfig, VigiCam};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        println!("Usage: {} <IP> <Username> <Password> [sound-id] [volume]", args[0]);
        std::process::exit(1);
    }

    let sound_id: u32 = args.get(4).map(|s| s.parse()).transpose()?.unwrap_or(1);
    let volume: u8 = args.get(5).map(|s| s.parse()).transpose()?.unwrap_or(30);

    let mut cam = VigiCam::new(CameraConfig {
        host: args[1].clone(),
        username: args[2].clone(),
        password: args[3].clone(),
    });

    cam.authenticate().await?;

    println!("Triggering the sound and light alarm...");
    cam.trigger_manual_alarm(AlarmAction::Start, Some(sound_id), Some(volume))
        .await?;

    println!("Alarm active, stopping in 5 seconds...");
    tokio::time::sleep(Duration::from_secs(5)).await;

    cam.trigger_manual_alarm(AlarmAction::Stop, None, None).await?;
    println!("Done.");

    Ok(())
}
