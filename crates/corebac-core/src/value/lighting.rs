//! BACnetLightingCommand, BACnetxyColor, and BACnetColorCommand codecs.

use crate::encoding::{primitives as prim, reader::Reader, tag::Tag, writer::Writer};
use crate::{DecodeError, EncodeError};

/// BACnetLightingCommand: a required `[0]` operation and a run of optional
/// ordered members.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightingCommand {
    pub operation: u32,
    pub target_level: Option<f32>,
    pub ramp_rate: Option<f32>,
    pub step_increment: Option<f32>,
    pub fade_time: Option<u32>,
    pub priority: Option<u8>,
}

impl LightingCommand {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        prim::encode_ctx_enumerated(w, 0, self.operation)?;
        if let Some(level) = self.target_level {
            prim::encode_ctx_real(w, 1, level)?;
        }
        if let Some(rate) = self.ramp_rate {
            prim::encode_ctx_real(w, 2, rate)?;
        }
        if let Some(step) = self.step_increment {
            prim::encode_ctx_real(w, 3, step)?;
        }
        if let Some(fade) = self.fade_time {
            prim::encode_ctx_unsigned(w, 4, fade as u64)?;
        }
        if let Some(priority) = self.priority {
            prim::encode_ctx_unsigned(w, 5, priority as u64)?;
        }
        Ok(())
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let operation = prim::decode_ctx_enumerated(r, 0)?;
        let mut command = Self {
            operation,
            ..Self::default()
        };
        command.target_level = decode_opt_ctx_real(r, 1)?;
        command.ramp_rate = decode_opt_ctx_real(r, 2)?;
        command.step_increment = decode_opt_ctx_real(r, 3)?;
        if let Some(fade) = decode_opt_ctx_unsigned(r, 4)? {
            command.fade_time =
                Some(u32::try_from(fade).map_err(|_| DecodeError::ValueOutOfRange)?);
        }
        if let Some(priority) = decode_opt_ctx_unsigned(r, 5)? {
            command.priority =
                Some(u8::try_from(priority).map_err(|_| DecodeError::ValueOutOfRange)?);
        }
        Ok(command)
    }

    pub fn encoded_len(&self) -> usize {
        let mut len = 1 + prim::unsigned_encoded_len(self.operation as u64);
        len += self.target_level.map_or(0, |_| 5);
        len += self.ramp_rate.map_or(0, |_| 5);
        len += self.step_increment.map_or(0, |_| 5);
        len += self
            .fade_time
            .map_or(0, |v| 1 + prim::unsigned_encoded_len(v as u64));
        len += self
            .priority
            .map_or(0, |v| 1 + prim::unsigned_encoded_len(v as u64));
        len
    }
}

/// BACnetxyColor: CIE chromaticity coordinates as two application Reals.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct XyColor {
    pub x: f32,
    pub y: f32,
}

impl XyColor {
    pub const ENCODED_LEN: usize = 10;

    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        prim::encode_app_real(w, self.x)?;
        prim::encode_app_real(w, self.y)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            x: prim::decode_app_real(r)?,
            y: prim::decode_app_real(r)?,
        })
    }
}

/// BACnetColorCommand: `[0]` operation plus optional target and transition
/// members.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColorCommand {
    pub operation: u32,
    pub target_color: Option<XyColor>,
    pub target_color_temperature: Option<u32>,
    pub fade_time: Option<u32>,
    pub ramp_rate: Option<u32>,
    pub step_increment: Option<u32>,
}

impl ColorCommand {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        prim::encode_ctx_enumerated(w, 0, self.operation)?;
        if let Some(color) = &self.target_color {
            prim::encode_opening_tag(w, 1)?;
            color.encode(w)?;
            prim::encode_closing_tag(w, 1)?;
        }
        if let Some(temperature) = self.target_color_temperature {
            prim::encode_ctx_unsigned(w, 2, temperature as u64)?;
        }
        if let Some(fade) = self.fade_time {
            prim::encode_ctx_unsigned(w, 3, fade as u64)?;
        }
        if let Some(rate) = self.ramp_rate {
            prim::encode_ctx_unsigned(w, 4, rate as u64)?;
        }
        if let Some(step) = self.step_increment {
            prim::encode_ctx_unsigned(w, 5, step as u64)?;
        }
        Ok(())
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let operation = prim::decode_ctx_enumerated(r, 0)?;
        let mut command = Self {
            operation,
            ..Self::default()
        };
        if let Ok(Tag::Opening { tag_num: 1 }) = prim::peek_tag(r) {
            prim::expect_opening(r, 1)?;
            command.target_color = Some(XyColor::decode(r)?);
            prim::expect_closing(r, 1)?;
        }
        command.target_color_temperature = decode_opt_ctx_u32(r, 2)?;
        command.fade_time = decode_opt_ctx_u32(r, 3)?;
        command.ramp_rate = decode_opt_ctx_u32(r, 4)?;
        command.step_increment = decode_opt_ctx_u32(r, 5)?;
        Ok(command)
    }

    pub fn encoded_len(&self) -> usize {
        let mut len = 1 + prim::unsigned_encoded_len(self.operation as u64);
        len += self.target_color.map_or(0, |_| 2 + XyColor::ENCODED_LEN);
        for member in [
            self.target_color_temperature,
            self.fade_time,
            self.ramp_rate,
            self.step_increment,
        ] {
            len += member.map_or(0, |v| 1 + prim::unsigned_encoded_len(v as u64));
        }
        len
    }
}

fn decode_opt_ctx_real(r: &mut Reader<'_>, tag_num: u8) -> Result<Option<f32>, DecodeError> {
    match prim::peek_tag(r) {
        Ok(Tag::Context { tag_num: n, len: 4 }) if n == tag_num => {
            Tag::decode(r)?;
            Ok(Some(prim::decode_real_content(r)?))
        }
        _ => Ok(None),
    }
}

fn decode_opt_ctx_unsigned(r: &mut Reader<'_>, tag_num: u8) -> Result<Option<u64>, DecodeError> {
    match prim::peek_tag(r) {
        Ok(Tag::Context { tag_num: n, len }) if n == tag_num => {
            Tag::decode(r)?;
            Ok(Some(prim::decode_unsigned(r, len as usize)?))
        }
        _ => Ok(None),
    }
}

fn decode_opt_ctx_u32(r: &mut Reader<'_>, tag_num: u8) -> Result<Option<u32>, DecodeError> {
    match decode_opt_ctx_unsigned(r, tag_num)? {
        Some(v) => Ok(Some(
            u32::try_from(v).map_err(|_| DecodeError::ValueOutOfRange)?,
        )),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorCommand, LightingCommand, XyColor};
    use crate::encoding::{reader::Reader, writer::Writer};

    #[test]
    fn lighting_command_roundtrips_with_and_without_optionals() {
        let commands = [
            LightingCommand {
                operation: 1,
                ..LightingCommand::default()
            },
            LightingCommand {
                operation: 2,
                target_level: Some(75.0),
                ramp_rate: Some(10.0),
                step_increment: None,
                fade_time: Some(2000),
                priority: Some(6),
            },
        ];
        for command in commands {
            let mut buf = [0u8; 64];
            let mut w = Writer::new(&mut buf);
            command.encode(&mut w).unwrap();
            assert_eq!(w.position(), command.encoded_len());
            let mut r = Reader::new(w.as_written());
            assert_eq!(LightingCommand::decode(&mut r).unwrap(), command);
        }
    }

    #[test]
    fn xy_color_roundtrip() {
        let color = XyColor { x: 0.31, y: 0.33 };
        let mut buf = [0u8; 16];
        let mut w = Writer::new(&mut buf);
        color.encode(&mut w).unwrap();
        assert_eq!(w.position(), XyColor::ENCODED_LEN);
        let mut r = Reader::new(w.as_written());
        assert_eq!(XyColor::decode(&mut r).unwrap(), color);
    }

    #[test]
    fn color_command_roundtrips_with_target_color() {
        let command = ColorCommand {
            operation: 4,
            target_color: Some(XyColor { x: 0.45, y: 0.41 }),
            target_color_temperature: None,
            fade_time: Some(100),
            ramp_rate: None,
            step_increment: None,
        };
        let mut buf = [0u8; 64];
        let mut w = Writer::new(&mut buf);
        command.encode(&mut w).unwrap();
        assert_eq!(w.position(), command.encoded_len());
        let mut r = Reader::new(w.as_written());
        assert_eq!(ColorCommand::decode(&mut r).unwrap(), command);
    }
}
