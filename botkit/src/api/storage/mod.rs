pub mod callback_data_storage;
