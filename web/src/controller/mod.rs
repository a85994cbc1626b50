pub(crate) mod health_check_controller;
