pub mod external_crops_service;
