use netsync_shared::{
    ByteReader, ByteWrite, MessageKind, Opcode, RouteId, Serde, SerdeErr, StreamWriter,
};

/// Payload of an `Opcode::Routed` packet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutedEnvelope {
    pub id: RouteId,
    pub require_ack: bool,
    pub kind: MessageKind,
    pub payload: Vec<u8>,
}

impl RoutedEnvelope {
    /// Frames the envelope behind its opcode byte
    pub fn to_packet(&self) -> Vec<u8> {
        let mut writer = StreamWriter::with_buffer(Vec::with_capacity(1 + self.byte_length()));
        writer.write_byte(Opcode::Routed.to_byte());
        self.ser(&mut writer);
        writer.to_bytes()
    }
}

impl Serde for RoutedEnvelope {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.id.ser(writer);
        self.require_ack.ser(writer);
        self.kind.ser(writer);
        self.payload.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let id = RouteId::de(reader)?;
        let require_ack = bool::de(reader)?;
        let kind = MessageKind::de(reader)?;
        let payload = Vec::<u8>::de(reader)?;
        Ok(Self {
            id,
            require_ack,
            kind,
            payload,
        })
    }

    fn byte_length(&self) -> usize {
        4 + 1 + 2 + self.payload.byte_length()
    }
}

/// Payload of an `Opcode::RouteAck` packet
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteAck {
    pub id: RouteId,
}

impl RouteAck {
    pub fn to_packet(&self) -> Vec<u8> {
        let mut writer = StreamWriter::with_buffer(Vec::with_capacity(5));
        writer.write_byte(Opcode::RouteAck.to_byte());
        self.ser(&mut writer);
        writer.to_bytes()
    }
}

impl Serde for RouteAck {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.id.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            id: RouteId::de(reader)?,
        })
    }

    fn byte_length(&self) -> usize {
        4
    }
}
