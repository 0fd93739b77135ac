use netsync::{router::RoutedEnvelope, Ingress};
use netsync_shared::{ByteReader, LoopbackEndpoint, Opcode, RecvError, Serde};

use super::SentPacket;

/// Moves every packet waiting at `endpoint` into `ingress`. Returns the
/// number of packets ingested.
pub fn pump(endpoint: &LoopbackEndpoint, ingress: &Ingress) -> Result<usize, RecvError> {
    let mut count = 0;
    while let Some(packet) = endpoint.receive()? {
        if ingress.ingest_packet(&packet).is_ok() {
            count += 1;
        }
    }
    Ok(count)
}

/// Route ids of the routed envelopes among `packets`, in send order
pub fn wire_ids(packets: &[SentPacket]) -> Vec<u32> {
    packets
        .iter()
        .filter_map(|packet| {
            let (opcode, payload) = Opcode::split_packet(&packet.bytes).ok()?;
            if opcode != Opcode::Routed {
                return None;
            }
            let mut reader = ByteReader::new(payload);
            RoutedEnvelope::de(&mut reader)
                .ok()
                .map(|envelope| envelope.id.value())
        })
        .collect()
}
