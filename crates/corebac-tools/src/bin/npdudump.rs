//! Decode a hex-encoded BACnet PDU from the command line and print the
//! network-layer header fields.

use clap::Parser;
use corebac_core::apdu::PduType;
use corebac_core::encoding::Reader;
use corebac_core::npdu::{Address, Npdu};

#[derive(Parser, Debug)]
#[command(name = "npdudump", about = "Dump the NPDU header of a hex-encoded PDU")]
struct Args {
    /// PDU octets as hex, e.g. "01 20 00 01 01 05 ff" (spaces optional).
    pdu: Vec<String>,
}

fn parse_hex(words: &[String]) -> Result<Vec<u8>, String> {
    let joined: String = words
        .iter()
        .flat_map(|word| word.chars())
        .filter(|ch| !ch.is_whitespace())
        .collect();
    if joined.len() % 2 != 0 {
        return Err("odd number of hex digits".into());
    }
    (0..joined.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&joined[i..i + 2], 16).map_err(|e| e.to_string()))
        .collect()
}

fn print_address(label: &str, addr: &Address) {
    if addr.is_global_broadcast() {
        println!("{label}: global broadcast");
    } else if addr.is_network_broadcast() {
        println!("{label}: broadcast on network {}", addr.net);
    } else {
        println!("{label}: network {} mac {:02x?}", addr.net, addr.mac());
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let pdu = match parse_hex(&args.pdu) {
        Ok(pdu) => pdu,
        Err(err) => {
            eprintln!("bad hex input: {err}");
            std::process::exit(2);
        }
    };

    let mut r = Reader::new(&pdu);
    let header = match Npdu::decode(&mut r) {
        Ok(header) => header,
        Err(err) => {
            eprintln!("NPDU decode failed: {err}");
            std::process::exit(1);
        }
    };

    println!("protocol version: {}", header.protocol_version);
    println!("priority: {:?}", header.priority);
    println!("data expecting reply: {}", header.data_expecting_reply);
    match header.destination {
        Some(dest) => {
            print_address("destination", &dest);
            println!("hop count: {}", header.hop_count);
        }
        None => println!("destination: local"),
    }
    if let Some(src) = header.source {
        print_address("source", &src);
    }

    match header.network_message {
        Some(message) => {
            println!("network message type: 0x{:02x}", message.message_type);
            if message.message_type >= 0x80 {
                println!("vendor id: {}", message.vendor_id);
            }
        }
        None => {
            let apdu = &pdu[r.position()..];
            match apdu.first().copied().and_then(PduType::from_first_octet) {
                Some(pdu_type) => {
                    println!("apdu: {:?}, {} octet(s)", pdu_type, apdu.len());
                    println!("confirmed service: {}", Npdu::is_confirmed_service(&pdu));
                }
                None => println!("apdu: absent"),
            }
        }
    }
}
