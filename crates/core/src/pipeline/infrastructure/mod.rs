pub mod live_detection_worker;
