pub mod convert;
pub mod fourier;
pub mod ring_buffer;
pub mod wav_format;
