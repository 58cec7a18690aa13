pub mod bootloader_env;
#[cfg(test)]
mod test_util;
