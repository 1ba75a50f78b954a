// ipsa-sched: four periodic jobs on esp-rtos (ESP32-C3)

#![no_std]

pub mod kernel;
