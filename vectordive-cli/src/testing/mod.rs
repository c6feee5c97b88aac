pub mod mock_vehicle;
