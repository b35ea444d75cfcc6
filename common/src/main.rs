use anyhow::{anyhow, Context, Result};
// Library imports
use declaration::{
    constants::{DEFAULT_LOW_SIZE, DEFAULT_UP_SIZE},
    models::CliDeclarationPayload,
    protected::{verify, Protected},
    rsa::init_pair_keys,
    serialization::{key_to_str, protected_to_str, str_to_key, str_to_protected},
    signature::sign,
};
// Logging
use log::{debug, error, info};
// CLI interaction
use dialoguer::{Confirm, Input, Select};
use rand::thread_rng;
use std::fs;
use std::io::{stdin, Read};
use std::path::Path;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let modes = &["Generate key pair", "Sign declaration", "Verify declaration"];
    let mode_idx = Select::new()
        .with_prompt("Select operation mode")
        .items(modes)
        .default(0)
        .interact()?;

    match mode_idx {
        0 => handle_generate()?,
        1 => handle_sign()?,
        2 => handle_verify()?,
        _ => unreachable!(),
    }

    Ok(())
}

// --- Generate Mode ---
fn handle_generate() -> Result<()> {
    info!("--- Generate Mode ---");

    let low_size: u32 = Input::<u32>::new()
        .with_prompt("Minimum prime size (bits)")
        .default(DEFAULT_LOW_SIZE)
        .interact_text()?;
    let up_size: u32 = Input::<u32>::new()
        .with_prompt("Maximum prime size (bits)")
        .default(DEFAULT_UP_SIZE)
        .interact_text()?;

    let mut rng = thread_rng();
    let keypair = init_pair_keys(low_size, up_size, &mut rng)
        .with_context(|| format!("Failed to generate a key pair in [{}, {}] bits", low_size, up_size))?;

    println!("\n--- Generated Key Pair ---");
    println!("Public key : {}", key_to_str(&keypair.public));
    println!("Private key: {}", key_to_str(&keypair.secret));
    println!("--- End of Key Pair ---");
    Ok(())
}

// --- Sign Mode ---
fn handle_sign() -> Result<()> {
    info!("--- Sign Mode ---");

    let secret_str: String = Input::<String>::new()
        .with_prompt("Signer PRIVATE key, (exponent,modulus)")
        .interact_text()?;
    let secret = str_to_key(&secret_str).context("Failed to parse private key")?;

    let public_str: String = Input::<String>::new()
        .with_prompt("Signer PUBLIC key, (exponent,modulus)")
        .interact_text()?;
    let public = str_to_key(&public_str).context("Failed to parse public key")?;

    if public.modulus != secret.modulus {
        return Err(anyhow!("Signer public and private key modulus mismatch!"));
    }

    let message: String = Input::<String>::new()
        .with_prompt("Enter the message to declare")
        .interact_text()?;
    info!("Message to sign: {}", message);

    let signature = sign(&message, &secret).context("Failed to sign message")?;
    let protected = Protected::new(public, message, signature);

    // --- Self-Verification ---
    info!("Verifying generated declaration...");
    if !verify(&protected) {
        error!("Self-verification FAILED! The keys do not match or the modulus is too small.");
        return Err(anyhow!("Generated declaration failed self-verification"));
    }
    info!("Self-verification successful.");

    let text = protected_to_str(&protected).context("Failed to encode declaration")?;
    let payload = CliDeclarationPayload::from_protected(&protected)
        .context("Failed to build JSON payload")?;
    let json_output =
        serde_json::to_string_pretty(&payload).context("Failed to serialize declaration to JSON")?;

    println!("\n--- Protected Declaration ---");
    println!("{}", text);
    println!("--- JSON ---");
    println!("{}", json_output);
    println!("--- End of Declaration ---");

    let save_to_file = Confirm::new()
        .with_prompt("Save declaration JSON to a file?")
        .default(false)
        .interact()?;

    if save_to_file {
        let output_path: String = Input::<String>::new()
            .with_prompt("Enter output filename")
            .default("declaration.json".to_string())
            .interact_text()?;

        info!("Saving declaration to file: {}", output_path);
        fs::write(&output_path, &json_output)
            .with_context(|| format!("Failed to write declaration to file '{}'", output_path))?;
        info!("Declaration successfully saved to {}", output_path);
    }

    Ok(())
}

// --- Verify Mode ---
fn handle_verify() -> Result<()> {
    info!("--- Verify Mode ---");

    let input_methods = &[
        "Type declaration text",
        "Read JSON from file",
        "Paste JSON from stdin",
    ];
    let input_method_idx = Select::new()
        .with_prompt("How to provide the declaration?")
        .items(input_methods)
        .default(0)
        .interact()?;

    let protected = match input_method_idx {
        0 => {
            let text: String = Input::<String>::new()
                .with_prompt("Declaration, <key> <message> <signature>")
                .interact_text()?;
            str_to_protected(&text).context("Failed to parse declaration text")?
        }
        1 => {
            let input_path: String = Input::<String>::new()
                .with_prompt("Enter declaration JSON file path")
                .default("declaration.json".to_string())
                .validate_with(|input: &String| -> Result<(), &str> {
                    if Path::new(input).exists() {
                        Ok(())
                    } else {
                        Err("File does not exist")
                    }
                })
                .interact_text()?;
            info!("Reading declaration from file: {}", input_path);
            let json = fs::read_to_string(&input_path)
                .with_context(|| format!("Failed to read declaration file '{}'", input_path))?;
            parse_payload(&json)?
        }
        2 => {
            println!("Paste the declaration JSON below and press Ctrl+D (Unix) or Ctrl+Z then Enter (Windows) when done:");
            let mut buffer = String::new();
            stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read declaration JSON from stdin")?;
            parse_payload(&buffer)?
        }
        _ => unreachable!(),
    };
    debug!("Parsed declaration: {:?}", protected);

    println!("\n--- Verification Result ---");
    if verify(&protected) {
        println!("Declaration is VALID.");
        info!("Verification successful.");
    } else {
        println!("Declaration is INVALID.");
        info!("Verification failed.");
    }
    println!("--- End of Verification ---");

    Ok(())
}

fn parse_payload(json: &str) -> Result<Protected> {
    info!("Parsing declaration JSON...");
    let payload: CliDeclarationPayload =
        serde_json::from_str(json).context("Failed to parse declaration JSON input")?;
    debug!("Parsed declaration payload: {:?}", payload);
    payload
        .to_protected()
        .context("Declaration JSON holds malformed fields")
}
