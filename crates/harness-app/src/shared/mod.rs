pub mod frame_slot;
