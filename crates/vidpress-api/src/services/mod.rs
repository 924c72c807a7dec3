pub mod archive_stream;
