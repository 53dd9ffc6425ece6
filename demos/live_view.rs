use vigi_rs::{Authentication, CameraConfig, Streaming, VigiCam};

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

    let stream = cam.create_camera_stream();
    println!("Opening live view, close the window to exit...");
    stream.show_live_stream("VIGI Camera Live Stream").await?;

    Ok(())
}
