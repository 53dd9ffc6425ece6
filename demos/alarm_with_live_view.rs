use std::time::Duration;
use vigi_rs::{Alarm, AlarmAction, Authentication, CameraConfig, Streaming, VigiCam};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        println!("Usage: {} <IP> <Username> <Password>", args[0]);
        std::process::exit(1);
    }

    let mut cam = VigiCam::new(CameraConfig {
        host: args[1].clone(),
        username: args[2].clone(),
        password: args[3].clone(),
    });

    cam.authenticate().await?;

    // The viewer runs on its own task; alarm calls stay on this one.
    let stream = cam.create_camera_stream();
    let viewer = tokio::spawn(async move {
        stream.show_live_stream("VIGI Camera Live Stream").await
    });

    println!("Viewer starting, triggering the alarm in 2 seconds...");
    tokio::time::sleep(Duration::from_secs(2)).await;

    cam.trigger_manual_alarm(AlarmAction::Start, Some(1), Some(10))
        .await?;
    tokio::time::sleep(Duration::from_secs(5)).await;
    cam.trigger_manual_alarm(AlarmAction::Stop, None, None).await?;

    println!("Alarm demo finished, close the viewer window to exit.");
    viewer.await??;

    Ok(())
}
