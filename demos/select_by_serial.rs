use hidapi::HidApi;
use minicircuits_hid::{
    AttenuatorClient, OpenOptions, PowerSensorClient, Result, SwitchClient, VENDOR_ID,
};
use std::env;

fn usage() {
    eprintln!("Usage: select_by_serial <SERIAL> [attenuator|switch|powersensor]");
}

fn main() -> Result<()> {
    env_logger::init();
    let mut args = env::args().skip(1);
    let Some(serial) = args.next() else {
        usage();
        return Ok(());
    };
    let kind = args.next().unwrap_or_else(|| "attenuator".to_string());

    let hid_api = HidApi::new()?;
    let options = OpenOptions::new().serial(serial.clone());
    println!(
        "Looking for {} with serial '{}' (VID=0x{:04X})...",
        kind, serial, VENDOR_ID
    );

    match kind.as_str() {
        "attenuator" => {
            let mut atten = AttenuatorClient::open(&hid_api, &options)?;
            let info = atten.identify()?;
            println!("Opened {} (serial {})", info.part_number, info.serial);
            println!("Attenuation: {:.2} dB", atten.get_attenuation()?);
        }
        "switch" => {
            let mut switch = SwitchClient::open(&hid_api, &options)?;
            let info = switch.identify()?;
            println!("Opened {} (serial {})", info.part_number, info.serial);
            println!("Active port: {}", switch.get_active_port()?);
        }
        "powersensor" => {
            let mut sensor = PowerSensorClient::open(&hid_api, &options)?;
            println!(
                "Opened {} (serial {}, firmware {})",
                sensor.get_model_name()?,
                sensor.get_serial()?,
                sensor.get_firmware_version()?
            );
            println!("Temperature: {:.2} °C", sensor.get_temperature()?);
        }
        _ => usage(),
    }

    Ok(())
}
