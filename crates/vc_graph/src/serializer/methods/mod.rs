mod deserialize;
mod serialize;
